pub mod openai;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use super::{ LlmConfig, LlmType, SamplingParams };
use self::openai::OpenAIChatClient;
use crate::models::chat::ConversationTurn;

/// Classified provider failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("provider rejected the credential: {0}")]
    AuthInvalid(String),
    #[error("provider call failed: {0}")]
    UnreachableOrOther(String),
}

impl ProviderError {
    /// Maps the provider's error code. The HTTP status alone never selects a
    /// specific kind, so a plain 429 rate limit lands in the generic bucket.
    pub fn classify(code: Option<&str>, detail: String) -> Self {
        match code {
            Some("insufficient_quota") => ProviderError::QuotaExceeded(detail),
            Some("invalid_api_key") => ProviderError::AuthInvalid(detail),
            _ => ProviderError::UnreachableOrOther(detail),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::UnreachableOrOther(err.to_string())
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the full ordered message list and returns the first completion's text.
    async fn complete(
        &self,
        messages: &[ConversationTurn],
        sampling: &SamplingParams
    ) -> Result<String, ProviderError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}
