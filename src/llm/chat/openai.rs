use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

use super::{ChatClient, ProviderError};
use crate::llm::{LlmConfig, SamplingParams};
use crate::models::chat::ConversationTurn;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIErrorEnvelope {
    error: OpenAIErrorBody,
}

#[derive(Deserialize)]
struct OpenAIErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| format!("Invalid API key format: {}", e))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| "OpenAI API key is required".to_string())?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
        )
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }
}

fn classify_error_body(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<OpenAIErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope.error.code.or(envelope.error.error_type);
            let detail = envelope.error.message.unwrap_or_else(|| format!("HTTP {}", status));
            ProviderError::classify(code.as_deref(), detail)
        }
        Err(_) => ProviderError::classify(None, format!("HTTP {}: {}", status, body)),
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ConversationTurn],
        sampling: &SamplingParams
    ) -> Result<String, ProviderError> {
        let url = self.completions_url();

        let req = OpenAIChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|turn| OpenAIMessage {
                    role: turn.role().as_str().to_string(),
                    content: turn.content().to_string(),
                })
                .collect(),
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            presence_penalty: sampling.presence_penalty,
            frequency_penalty: sampling.frequency_penalty,
        };

        debug!("Sending {} messages to {}", req.messages.len(), url);
        let resp = self.http.post(&url).json(&req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_error_body(status.as_u16(), &body));
        }

        let parsed = resp.json::<OpenAIResponse>().await?;
        parsed.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::UnreachableOrOther("No response from OpenAI API".to_string()))
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAIChatClient {
        OpenAIChatClient::new("sk-test".into(), None, Some(server.uri())).unwrap()
    }

    #[test]
    fn completions_url_accepts_several_base_forms() {
        let plain = OpenAIChatClient::new("k".into(), None, Some("http://h/".into())).unwrap();
        assert_eq!(plain.completions_url(), "http://h/v1/chat/completions");
        let v1 = OpenAIChatClient::new("k".into(), None, Some("http://h/v1".into())).unwrap();
        assert_eq!(v1.completions_url(), "http://h/v1/chat/completions");
        let full = OpenAIChatClient::new(
            "k".into(),
            None,
            Some("http://h/v1/chat/completions".into())
        ).unwrap();
        assert_eq!(full.completions_url(), "http://h/v1/chat/completions");
    }

    #[tokio::test]
    async fn sends_messages_and_sampling_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 500,
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "first" } },
                    { "message": { "role": "assistant", "content": "second" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let messages = vec![ConversationTurn::system("sys"), ConversationTurn::user("hello")];
        let text = client_for(&server)
            .complete(&messages, &SamplingParams::default())
            .await
            .unwrap();
        assert_eq!(text, "first");
    }

    #[tokio::test]
    async fn quota_error_code_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "You exceeded your quota", "code": "insufficient_quota" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&[ConversationTurn::user("hi")], &SamplingParams::default())
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::QuotaExceeded("You exceeded your quota".into()));
    }

    #[tokio::test]
    async fn invalid_key_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Incorrect API key", "code": "invalid_api_key" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&[ConversationTurn::user("hi")], &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::AuthInvalid(_)));
    }

    #[tokio::test]
    async fn rate_limit_without_quota_code_is_other() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit reached", "code": "rate_limit_exceeded" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&[ConversationTurn::user("hi")], &SamplingParams::default())
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::UnreachableOrOther("Rate limit reached".into()));
    }

    #[tokio::test]
    async fn empty_choices_and_server_errors_are_other() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&server)
            .await;
        let err = client_for(&server)
            .complete(&[ConversationTurn::user("hi")], &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnreachableOrOther(_)));

        let broken = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&broken)
            .await;
        let err = client_for(&broken)
            .complete(&[ConversationTurn::user("hi")], &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnreachableOrOther(_)));
    }
}
