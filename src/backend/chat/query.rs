use crate::backend::store::{SharedStore, StoreError};
use crate::shared::{sort_feed, Message};

/// Read side of the feed
///
/// Every call reads the whole store and orders it newest first, ties broken
/// by ascending id, so two snapshots of the same store are identical.
#[derive(Clone)]
pub struct QueryService {
    store: SharedStore,
}

impl QueryService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn snapshot(&self) -> Result<Vec<Message>, StoreError> {
        let mut messages = self.store.get_all().await.map_err(|e| {
            tracing::error!(
                "[Store] Failed to read feed from {} store: {}",
                self.store.backend_name(),
                e
            );
            e
        })?;
        sort_feed(&mut messages);
        tracing::debug!("[Gateway] Snapshot of {} messages", messages.len());
        Ok(messages)
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("store", &self.store.backend_name())
            .finish()
    }
}
