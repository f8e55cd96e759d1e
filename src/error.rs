use axum::http::StatusCode;
use thiserror::Error;
use crate::language::Language;
use crate::llm::chat::ProviderError;

/// Every failure the chat endpoint can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Message is required")]
    InvalidInput,
    #[error("Completion provider API key not configured")]
    NotConfigured,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("provider quota exceeded: {0}")]
    ProviderQuotaExceeded(String),
    #[error("provider authentication failed: {0}")]
    ProviderAuthInvalid(String),
    #[error("provider unreachable or failed: {0}")]
    ProviderUnreachableOrOther(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput => StatusCode::BAD_REQUEST,
            GatewayError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::ProviderQuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::ProviderAuthInvalid(_) => StatusCode::UNAUTHORIZED,
            GatewayError::ProviderUnreachableOrOther(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::ProviderQuotaExceeded(_) |
                GatewayError::ProviderAuthInvalid(_) |
                GatewayError::ProviderUnreachableOrOther(_)
        )
    }

    /// Message shown to the visitor. Provider failures are phrased in the
    /// visitor's language and never carry provider detail.
    pub fn user_message(&self, language: Language) -> String {
        let japanese = language == Language::Ja;
        match self {
            GatewayError::ProviderQuotaExceeded(_) if japanese =>
                "API使用制限に達しました。しばらく時間をおいてからお試しください。".to_string(),
            GatewayError::ProviderQuotaExceeded(_) =>
                "The API usage limit has been reached. Please try again later.".to_string(),
            GatewayError::ProviderAuthInvalid(_) if japanese =>
                "API設定エラーが発生しました。".to_string(),
            GatewayError::ProviderAuthInvalid(_) =>
                "An API configuration error occurred.".to_string(),
            GatewayError::ProviderUnreachableOrOther(_) if japanese =>
                "チャットボットエラーが発生しました。".to_string(),
            GatewayError::ProviderUnreachableOrOther(_) =>
                "A chatbot error occurred.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::QuotaExceeded(detail) => GatewayError::ProviderQuotaExceeded(detail),
            ProviderError::AuthInvalid(detail) => GatewayError::ProviderAuthInvalid(detail),
            ProviderError::UnreachableOrOther(detail) =>
                GatewayError::ProviderUnreachableOrOther(detail),
        }
    }
}
