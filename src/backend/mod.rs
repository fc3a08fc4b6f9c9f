//! Backend Module
//!
//! This module contains all server-side code: the authoritative write path,
//! the read path, persistence, and the real-time fan-out.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`store`** - `MessageStore` trait with memory and SQLite backends
//! - **`chat`** - `PublishGateway`, `QueryService`, and their HTTP handlers
//! - **`realtime`** - `FanoutBus` and the `GET /subscribe` SSE endpoint
//! - **`server`** - application state, configuration, initialization
//! - **`routes`** - router assembly
//! - **`error`** - `BackendError`, the HTTP-facing error type
//!
//! # Request Flow
//!
//! ```text
//! POST /addMessage -> PublishGateway::accept -> MessageStore::put -> FanoutBus::publish
//!                                                                       |
//! GET /subscribe  <----------------- new-message (SSE) <-----------------+
//! GET /getMessages -> QueryService::snapshot -> MessageStore::get_all
//! ```
//!
//! # Thread Safety
//!
//! Handlers share no lock across requests. The store serializes its own
//! writes and the bus hands every subscriber its own receiver.

/// Message persistence
pub mod store;

/// Write and read paths
pub mod chat;

/// Real-time fan-out
pub mod realtime;

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

pub use chat::{PublishGateway, QueryService};
pub use error::BackendError;
pub use realtime::FanoutBus;
pub use server::create_app;
