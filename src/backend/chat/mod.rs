//! Chat Backend Module
//!
//! Server-side feed functionality:
//!
//! - **`gateway`** - `PublishGateway`, the validate/timestamp/persist/announce
//!   write path
//! - **`query`** - `QueryService`, ordered snapshots of the feed
//! - **`handlers`** - the HTTP endpoints over both
//!
//! # Example
//!
//! ```rust,no_run
//! use feedsync::backend::chat::{PublishGateway, QueryService};
//! use feedsync::backend::realtime::FanoutBus;
//! use feedsync::backend::store::MemoryStore;
//! use feedsync::shared::{Author, IncomingMessage, SystemClock};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let store = Arc::new(MemoryStore::new());
//! let gateway = PublishGateway::new(store.clone(), Arc::new(FanoutBus::default()), Arc::new(SystemClock));
//! let query = QueryService::new(store);
//!
//! let author = Author::new("Alice", "", "alice@example.com");
//! let raw = IncomingMessage {
//!     id: Some("m-1".into()),
//!     text: Some("Hello!".into()),
//!     ..Default::default()
//! };
//! gateway.accept(raw, Some(author)).await.unwrap();
//! assert_eq!(query.snapshot().await.unwrap().len(), 1);
//! # }
//! ```

/// Write path
pub mod gateway;

/// Read path
pub mod query;

/// HTTP handlers
pub mod handlers;

pub use gateway::{GatewayError, PublishGateway};
pub use query::QueryService;
pub use handlers::{handle_add_message, handle_get_messages};
