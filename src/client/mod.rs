//! Client Module
//!
//! Viewer-side synchronization of the message feed.
//!
//! - **`engine`** - `ClientSyncEngine`: optimistic insert, confirm, rollback,
//!   event merge, resync, teardown
//! - **`cache`** - the ordered, id-unique local cache and its mutation log
//! - **`remote`** - `FeedGateway`, `FeedSource`, `FeedSubscription` seams
//! - **`transport`** - reqwest/SSE implementations of the seams
//! - **`session`** - `ViewerSession`, an engine plus its live subscription
//! - **`config`** - environment-driven viewer configuration
//! - **`error`** - `SyncError`

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod remote;
pub mod session;
pub mod transport;

pub use cache::{CacheMutation, CachedMessage, FeedCache};
pub use engine::{ClientSyncEngine, SyncPhase};
pub use error::SyncError;
pub use remote::{FeedGateway, FeedSource, FeedSubscription};
pub use session::ViewerSession;
