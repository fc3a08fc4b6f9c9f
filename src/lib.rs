//! feedsync - Main Library
//!
//! feedsync keeps a shared message feed consistent across many concurrently
//! connected readers and writers. Writers see their message immediately
//! (an optimistic, provisional entry); the server assigns the authoritative
//! timestamp, persists it and announces it to every live reader, and each
//! reader merges announcements into its own ordered, deduplicated cache.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and server
//!   - `Message`, `Author`, wire envelopes, the feed ordering
//!   - `FeedEvent`, clocks, identity and id collaborators, errors, config
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server: `POST /addMessage`, `GET /getMessages`, `GET /subscribe`
//!   - `PublishGateway`, `QueryService`, `FanoutBus`, message stores
//!
//! - **`client`** - Viewer-side synchronization
//!   - `ClientSyncEngine`: optimistic insert, confirm, rollback, event merge
//!   - HTTP/SSE transport and `ViewerSession`
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend modules and the server binary
//!
//! # Usage
//!
//! ## Server-Side
//!
//! ```rust,no_run
//! use feedsync::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() {
//! let config = ServerConfig::from_env().unwrap();
//! let app = create_app(&config).await.unwrap();
//! // Use app with Axum server
//! # }
//! ```
//!
//! ## Viewer
//!
//! ```rust,no_run
//! use feedsync::client::{transport::HttpGateway, ViewerSession};
//! use feedsync::shared::{AppConfig, Author, StaticIdentity};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = AppConfig::builder().server_url("http://127.0.0.1:3000").build().unwrap();
//! let http = Arc::new(HttpGateway::new(&config).unwrap());
//! let identity = Arc::new(StaticIdentity::signed_in(Author::new("Alice", "", "alice@example.com")));
//!
//! let session = ViewerSession::connect_http(http, identity, &config).await.unwrap();
//! session.engine().submit("Hello!").await.unwrap();
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `Result<T, E>` for fallible operations, `thiserror` enums per layer
//! - `shared::SharedError`, `backend::error::BackendError`, `client::SyncError`

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Viewer-side synchronization
pub mod client;
