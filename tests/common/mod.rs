#![allow(dead_code)]

use async_trait::async_trait;
use brewery_chat_gateway::config::prompt::load_prompts;
use brewery_chat_gateway::fallback::CannedResponses;
use brewery_chat_gateway::gateway::CompletionGateway;
use brewery_chat_gateway::handler::{ ChatHandler, HandlerSettings };
use brewery_chat_gateway::history::{ HistoryStore, InMemoryHistoryStore };
use brewery_chat_gateway::llm::SamplingParams;
use brewery_chat_gateway::llm::chat::{ ChatClient, ProviderError };
use brewery_chat_gateway::models::chat::ConversationTurn;
use std::sync::{ Arc, Mutex };

/// Provider stand-in that records every message list it receives.
pub struct StubProvider {
    reply: Result<String, ProviderError>,
    pub requests: Mutex<Vec<(Vec<ConversationTurn>, SamplingParams)>>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(text.to_string()), requests: Mutex::new(Vec::new()) })
    }

    pub fn failing(err: ProviderError) -> Arc<Self> {
        Arc::new(Self { reply: Err(err), requests: Mutex::new(Vec::new()) })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_messages(&self) -> Vec<ConversationTurn> {
        self.requests.lock().unwrap().last().map(|(m, _)| m.clone()).unwrap_or_default()
    }

    pub fn last_sampling(&self) -> Option<SamplingParams> {
        self.requests.lock().unwrap().last().map(|(_, s)| *s)
    }
}

#[async_trait]
impl ChatClient for StubProvider {
    async fn complete(
        &self,
        messages: &[ConversationTurn],
        sampling: &SamplingParams
    ) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push((messages.to_vec(), *sampling));
        self.reply.clone()
    }

    fn get_model(&self) -> String {
        "stub".to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub fn history_store() -> Arc<InMemoryHistoryStore> {
    Arc::new(InMemoryHistoryStore::new(20))
}

pub fn handler_with(
    provider: Option<Arc<StubProvider>>,
    history: Arc<InMemoryHistoryStore>,
    fallback_to_local: bool
) -> ChatHandler {
    let gateway = provider.map(|p| CompletionGateway::new(p as Arc<dyn ChatClient>));
    let history: Arc<dyn HistoryStore> = history;
    ChatHandler::new(
        gateway,
        history,
        load_prompts(None).unwrap(),
        CannedResponses::load(None).unwrap()
    ).with_settings(HandlerSettings {
        fallback_to_local,
        ..HandlerSettings::default()
    })
}
