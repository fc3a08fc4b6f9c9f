use super::{MessageStore, StoreError};
use crate::shared::Message;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Message store held entirely in process memory
///
/// Contents are lost on restart. The server falls back to this store when
/// `DATABASE_URL` is not set.
#[derive(Debug, Default)]
pub struct MemoryStore {
    messages: RwLock<HashMap<String, Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, mostly for tests
    pub fn with_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let messages = messages
            .into_iter()
            .map(|message| (message.id.clone(), message))
            .collect();
        Self {
            messages: RwLock::new(messages),
        }
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<Message> {
        self.messages.read().await.get(id).cloned()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn put(&self, id: &str, message: &Message) -> Result<(), StoreError> {
        let mut messages = self.messages.write().await;
        if messages.insert(id.to_string(), message.clone()).is_some() {
            tracing::debug!("[Store] Overwrote message {}", id);
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self.messages.read().await.values().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
