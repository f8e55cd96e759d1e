use log::{ debug, error };
use std::sync::Arc;
use crate::llm::SamplingParams;
use crate::llm::chat::{ ChatClient, ProviderError };
use crate::models::chat::ConversationTurn;

/// Everything sent to the provider for one exchange.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub prior_turns: Vec<ConversationTurn>,
    pub new_user_turn: ConversationTurn,
    pub sampling: SamplingParams,
}

impl CompletionRequest {
    pub fn new(
        system_prompt: &str,
        prior_turns: Vec<ConversationTurn>,
        new_user_text: &str,
        sampling: SamplingParams
    ) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
            prior_turns,
            new_user_turn: ConversationTurn::user(new_user_text),
            sampling,
        }
    }

    /// System prompt first, prior turns in order, the new user turn last.
    pub fn messages(&self) -> Vec<ConversationTurn> {
        let mut messages = Vec::with_capacity(self.prior_turns.len() + 2);
        messages.push(ConversationTurn::system(self.system_prompt.as_str()));
        messages.extend(self.prior_turns.iter().cloned());
        messages.push(self.new_user_turn.clone());
        messages
    }
}

/// Wraps the provider client. Does not read or write session history.
#[derive(Clone)]
pub struct CompletionGateway {
    client: Arc<dyn ChatClient>,
}

impl CompletionGateway {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    pub fn model(&self) -> String {
        self.client.get_model()
    }

    pub async fn complete(
        &self,
        system_prompt: &str,
        prior_turns: &[ConversationTurn],
        new_user_text: &str,
        sampling: SamplingParams
    ) -> Result<String, ProviderError> {
        let request = CompletionRequest::new(
            system_prompt,
            prior_turns.to_vec(),
            new_user_text,
            sampling
        );
        self.send(&request).await
    }

    pub async fn send(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let messages = request.messages();
        debug!(
            "Requesting completion: {} prior turns, model {}",
            request.prior_turns.len(),
            self.client.get_model()
        );
        self.client.complete(&messages, &request.sampling).await.map_err(|e| {
            error!("Completion provider error: {}", e);
            e
        })
    }
}
