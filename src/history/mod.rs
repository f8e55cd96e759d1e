mod memory;

pub use memory::InMemoryHistoryStore;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::cli::Args;
use crate::models::chat::ConversationTurn;

pub const DEFAULT_MAX_STORED: usize = 20;
pub const DEFAULT_FOR_PROMPT: usize = 10;

/// Turns recorded for one session, oldest first. Only ever grows by whole
/// user/assistant pairs, so its length stays even.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    turns: Vec<ConversationTurn>,
    max_stored: usize,
}

pub type SessionHandle = Arc<Mutex<SessionHistory>>;

impl SessionHistory {
    pub fn new(max_stored: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_stored,
        }
    }

    pub fn append_exchange(&mut self, user_text: &str, assistant_text: &str) {
        self.turns.push(ConversationTurn::user(user_text));
        self.turns.push(ConversationTurn::assistant(assistant_text));
        while self.turns.len() > self.max_stored {
            self.turns.drain(..2.min(self.turns.len()));
        }
    }

    /// The last `limit` turns, cloned. Leaves the stored turns untouched.
    pub fn recent(&self, limit: usize) -> Vec<ConversationTurn> {
        let start = self.turns.len().saturating_sub(limit);
        self.turns[start..].to_vec()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Handle to the session's turns, created empty on first reference.
    /// Holding its lock serializes every mutation of that session.
    async fn get_or_create(&self, session_id: &str) -> SessionHandle;

    async fn session_count(&self) -> usize;

    async fn append_exchange(&self, session_id: &str, user_text: &str, assistant_text: &str) {
        let session = self.get_or_create(session_id).await;
        session.lock().await.append_exchange(user_text, assistant_text);
    }

    async fn recent_for_prompt(&self, session_id: &str, limit: usize) -> Vec<ConversationTurn> {
        let session = self.get_or_create(session_id).await;
        let history = session.lock().await;
        history.recent(limit)
    }
}

pub fn initialize_history_store(args: &Args) -> Arc<dyn HistoryStore> {
    info!(
        "Chat history kept in memory: {} turns stored, {} sent per prompt",
        args.history_max_stored,
        args.history_for_prompt
    );
    Arc::new(InMemoryHistoryStore::new(args.history_max_stored))
}
