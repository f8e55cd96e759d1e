use chrono::Utc;
use log::{ error, info };
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use thiserror::Error;
use url::Url;
use uuid::Uuid;
use crate::fallback::CannedResponses;
use crate::language::detect_language_extended;

const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/chat";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("{0}")]
    Api(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("canned responses unavailable: {0}")]
    Fallback(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_endpoint: String,
    pub use_remote: bool,
    pub fallback_to_local: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            use_remote: true,
            fallback_to_local: true,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingMessage<'a> {
    message: &'a str,
    session_id: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
struct IncomingReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Caller of the chat endpoint. When the remote call fails and fallback is
/// enabled, the visitor gets a canned reply instead of an error.
pub struct ChatbotClient {
    http: HttpClient,
    endpoint: Url,
    session_id: String,
    use_remote: bool,
    fallback_to_local: bool,
    canned: Arc<CannedResponses>,
}

/// `session_<unix millis>_<9 lowercase alphanumerics>`
pub fn generate_session_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", Utc::now().timestamp_millis(), &random[..9])
}

impl ChatbotClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let canned = CannedResponses::embedded().map_err(|e| ClientError::Fallback(e.to_string()))?;
        Self::with_responses(config, Arc::new(canned))
    }

    pub fn with_responses(
        config: ClientConfig,
        canned: Arc<CannedResponses>
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http: HttpClient::new(),
            endpoint: Url::parse(&config.api_endpoint)?,
            session_id: generate_session_id(),
            use_remote: config.use_remote,
            fallback_to_local: config.fallback_to_local,
            canned,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn send_message(&self, message: &str) -> Result<String, ClientError> {
        if !self.use_remote {
            return Ok(self.local_response(message));
        }

        match self.send_remote(message).await {
            Ok(reply) => Ok(reply),
            Err(e) if self.fallback_to_local => {
                error!("Chat API error: {}", e);
                info!("Falling back to local response...");
                Ok(self.local_response(message))
            }
            Err(e) => Err(e),
        }
    }

    pub fn local_response(&self, message: &str) -> String {
        self.canned.respond(message).to_string()
    }

    async fn send_remote(&self, message: &str) -> Result<String, ClientError> {
        let language = detect_language_extended(message);
        let payload = OutgoingMessage {
            message,
            session_id: &self.session_id,
            language: language.tag(),
        };

        let resp = self.http.post(self.endpoint.clone()).json(&payload).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status(resp.status().as_u16()));
        }

        let reply: IncomingReply = resp.json().await?;
        if !reply.success {
            return Err(ClientError::Api(reply.error.unwrap_or_else(|| "API request failed".to_string())));
        }
        reply.response.ok_or_else(|| ClientError::Api("API request failed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_has_expected_shape() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = ClientConfig {
            api_endpoint: "not a url".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(ChatbotClient::new(config), Err(ClientError::Endpoint(_))));
    }

    #[tokio::test]
    async fn local_mode_never_calls_remote() {
        let config = ClientConfig {
            // nothing listens here
            api_endpoint: "http://127.0.0.1:9/api/chat".into(),
            use_remote: false,
            fallback_to_local: false,
        };
        let client = ChatbotClient::new(config).unwrap();
        let reply = client.send_message("history please").await.unwrap();
        assert!(reply.starts_with("Tenryo Brewery was founded"));
    }
}
