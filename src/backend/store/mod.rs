//! Message Store Module
//!
//! Durable key/value persistence for confirmed messages, keyed by the
//! client-chosen message id.
//!
//! # Contract
//!
//! - `put(id, message)` is an idempotent upsert: a second put for the same id
//!   overwrites the first, it never creates a second entry.
//! - `get_all()` returns every stored message in no particular order.
//!   Ordering belongs to the query service.
//! - A backend that cannot be reached surfaces `StoreError::Unavailable`.
//!   Stores never retry internally.
//!
//! # Backends
//!
//! - **`memory`** - `HashMap` behind a `tokio::sync::RwLock`; used when no
//!   database is configured and throughout the tests
//! - **`sqlite`** - `sqlx` SQLite pool with migrations

use crate::shared::Message;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// In-memory store
pub mod memory;

/// SQLite-backed store
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors surfaced by a message store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation
    #[error("message store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded
    #[error("corrupt record for message '{id}': {message}")]
    Corrupt { id: String, message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Persistence for confirmed messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert or overwrite the message stored under `id`
    async fn put(&self, id: &str, message: &Message) -> Result<(), StoreError>;

    /// Every stored message, unordered
    async fn get_all(&self) -> Result<Vec<Message>, StoreError>;

    /// Short name used in logs
    fn backend_name(&self) -> &'static str;
}

/// Store handle shared between the gateway and the query service
pub type SharedStore = Arc<dyn MessageStore>;
