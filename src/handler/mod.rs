pub mod function;

use axum::http::{ header, HeaderValue, Method, StatusCode };
use axum::response::{ IntoResponse, Response };
use chrono::{ SecondsFormat, Utc };
use log::{ debug, error, info, warn };
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use crate::cli::Args;
use crate::config::prompt::{ load_prompts, PromptConfig };
use crate::error::GatewayError;
use crate::fallback::CannedResponses;
use crate::gateway::CompletionGateway;
use crate::history::{ initialize_history_store, HistoryStore, DEFAULT_FOR_PROMPT };
use crate::language::{ detect_language, Language };
use crate::llm::{ LlmConfig, SamplingParams };
use crate::llm::chat::new_client as new_chat_client;
use crate::models::chat::{ ChatFailure, ChatRequest, ChatSuccess, HealthReport, ServiceStatus };

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const CHAT_METHODS: &str = "GET, POST, OPTIONS";
pub const HEALTH_METHODS: &str = "GET, OPTIONS";

/// Where the handler is running. Only changes the reported service identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingEnv {
    Server,
    Function,
}

impl HostingEnv {
    pub fn chat_service(&self) -> &'static str {
        match self {
            HostingEnv::Server => "Tenryo Chatbot API",
            HostingEnv::Function => "Tenryo Chatbot API (Function)",
        }
    }

    pub fn health_service(&self) -> &'static str {
        match self {
            HostingEnv::Server => "Tenryo Brewery Chatbot API",
            HostingEnv::Function => "Tenryo Brewery Chatbot API (Function)",
        }
    }
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Environment-neutral response produced by the core. Each hosting adapter
/// turns it into its own wire shape.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub allow_methods: &'static str,
    pub body: Option<serde_json::Value>,
}

impl HandlerResponse {
    fn preflight(allow_methods: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            allow_methods,
            body: None,
        }
    }

    fn json<T: Serialize>(status: StatusCode, allow_methods: &'static str, payload: &T) -> Self {
        let body = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                serde_json::json!({ "success": false, "error": "Internal error", "timestamp": timestamp() })
            }
        };
        Self {
            status,
            allow_methods,
            body: Some(body),
        }
    }

    fn failure(err: &GatewayError, language: Language) -> Self {
        Self::json(err.status_code(), CHAT_METHODS, &ChatFailure {
            success: false,
            error: err.user_message(language),
            timestamp: timestamp(),
        })
    }

    pub fn cors_headers(&self) -> [(&'static str, &'static str); 3] {
        [
            ("Access-Control-Allow-Origin", ALLOW_ORIGIN),
            ("Access-Control-Allow-Methods", self.allow_methods),
            ("Access-Control-Allow-Headers", ALLOW_HEADERS),
        ]
    }

    pub fn body_string(&self) -> String {
        self.body.as_ref().map(|b| b.to_string()).unwrap_or_default()
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let has_body = self.body.is_some();
        let mut response = (self.status, self.body_string()).into_response();
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(self.allow_methods)
        );
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
        if has_body {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        } else {
            headers.remove(header::CONTENT_TYPE);
        }
        response
    }
}

#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub history_for_prompt: usize,
    pub sampling: SamplingParams,
    pub fallback_to_local: bool,
    pub environment: String,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            history_for_prompt: DEFAULT_FOR_PROMPT,
            sampling: SamplingParams::default(),
            fallback_to_local: false,
            environment: "development".to_string(),
        }
    }
}

/// The chat orchestration shared by every hosting adapter.
#[derive(Clone)]
pub struct ChatHandler {
    gateway: Option<CompletionGateway>,
    history: Arc<dyn HistoryStore>,
    prompts: Arc<PromptConfig>,
    canned: Arc<CannedResponses>,
    settings: HandlerSettings,
}

impl ChatHandler {
    /// `gateway` is `None` when no provider credential is configured.
    pub fn new(
        gateway: Option<CompletionGateway>,
        history: Arc<dyn HistoryStore>,
        prompts: Arc<PromptConfig>,
        canned: Arc<CannedResponses>
    ) -> Self {
        Self {
            gateway,
            history,
            prompts,
            canned,
            settings: HandlerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: HandlerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let gateway = if args.provider_configured() {
            let config = LlmConfig {
                llm_type: args.chat_llm_type
                    .parse()
                    .map_err(|e| format!("Invalid chat LLM type: {}", e))?,
                api_key: Some(args.chat_api_key.clone()),
                completion_model: Some(args.chat_model.clone()),
                base_url: args.chat_base_url.clone(),
            };
            let client = new_chat_client(&config)?;
            let base_url = client.get_base_url();
            let gateway = CompletionGateway::new(client);
            info!(
                "Chat client configured: Type={}, Model={}, BaseURL={}",
                config.llm_type,
                gateway.model(),
                base_url.as_deref().unwrap_or("adapter default")
            );
            Some(gateway)
        } else {
            warn!("No provider API key configured; chat requests will be rejected");
            None
        };

        let prompts = load_prompts(args.prompts_path.as_deref())?;
        let canned = CannedResponses::load(args.fallback_responses_path.as_deref())?;
        let history = initialize_history_store(args);

        Ok(
            Self::new(gateway, history, prompts, canned).with_settings(HandlerSettings {
                history_for_prompt: args.history_for_prompt,
                sampling: SamplingParams::default(),
                fallback_to_local: args.fallback_to_local,
                environment: args.deploy_env.clone(),
            })
        )
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    pub fn provider_configured(&self) -> bool {
        self.gateway.is_some()
    }

    pub async fn handle_chat(&self, env: HostingEnv, method: &Method, body: &[u8]) -> HandlerResponse {
        match *method {
            Method::OPTIONS => HandlerResponse::preflight(CHAT_METHODS),
            Method::GET =>
                HandlerResponse::json(StatusCode::OK, CHAT_METHODS, &ServiceStatus {
                    status: "ok".to_string(),
                    service: env.chat_service().to_string(),
                    timestamp: timestamp(),
                }),
            Method::POST => self.handle_post(body).await,
            _ => HandlerResponse::failure(&GatewayError::MethodNotAllowed, Language::En),
        }
    }

    pub fn handle_health(&self, env: HostingEnv, method: &Method) -> HandlerResponse {
        if *method == Method::OPTIONS {
            return HandlerResponse::preflight(HEALTH_METHODS);
        }
        let configured = self.provider_configured();
        HandlerResponse::json(StatusCode::OK, HEALTH_METHODS, &HealthReport {
            status: "ok".to_string(),
            service: env.health_service().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: timestamp(),
            environment: self.settings.environment.clone(),
            provider_configured: configured,
            openai_configured: configured,
        })
    }

    async fn handle_post(&self, body: &[u8]) -> HandlerResponse {
        let request: ChatRequest = if body.is_empty() {
            ChatRequest::default()
        } else {
            serde_json::from_slice(body).unwrap_or_else(|e| {
                debug!("Unreadable chat body: {}", e);
                ChatRequest::default()
            })
        };

        let Some(message) = request.message_text() else {
            return HandlerResponse::failure(&GatewayError::InvalidInput, Language::En);
        };
        let language = detect_language(message);

        match self.exchange(request.session_id(), message).await {
            Ok(reply) =>
                HandlerResponse::json(StatusCode::OK, CHAT_METHODS, &ChatSuccess {
                    success: true,
                    response: reply,
                    detected_language: language.to_string(),
                    timestamp: timestamp(),
                }),
            Err(err) if err.is_provider_failure() && self.settings.fallback_to_local => {
                warn!("Provider failed ({}); answering with canned response", err);
                HandlerResponse::json(StatusCode::OK, CHAT_METHODS, &ChatSuccess {
                    success: true,
                    response: self.canned.respond(message).to_string(),
                    detected_language: language.to_string(),
                    timestamp: timestamp(),
                })
            }
            Err(err) => {
                if err.is_provider_failure() {
                    error!("Chat exchange failed: {}", err);
                }
                HandlerResponse::failure(&err, language)
            }
        }
    }

    /// Runs one exchange for a session. The session stays locked from
    /// reading the prompt window until the reply is appended.
    pub async fn exchange(&self, session_id: &str, message: &str) -> Result<String, GatewayError> {
        let gateway = self.gateway.as_ref().ok_or(GatewayError::NotConfigured)?;

        let session = self.history.get_or_create(session_id).await;
        debug!("Tracking {} sessions", self.history.session_count().await);
        let mut history = session.lock().await;
        let prior = history.recent(self.settings.history_for_prompt);

        let reply = gateway.complete(
            &self.prompts.system_prompt,
            &prior,
            message,
            self.settings.sampling
        ).await?;

        history.append_exchange(message, &reply);
        debug!("Session '{}' now holds {} turns", session_id, history.len());
        Ok(reply)
    }
}
