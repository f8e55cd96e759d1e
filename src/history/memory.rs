use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::history::{ HistoryStore, SessionHandle, SessionHistory };

/// Process-lifetime history. Sessions are never evicted.
pub struct InMemoryHistoryStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
    max_stored: usize,
}

impl InMemoryHistoryStore {
    pub fn new(max_stored: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_stored,
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionHistory::new(self.max_stored))))
            .clone()
    }

    async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
