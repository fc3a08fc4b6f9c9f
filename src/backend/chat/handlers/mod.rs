//! Chat Handlers Module
//!
//! Axum handlers for the feed endpoints.
//!
//! - **`add_message`** - `POST /addMessage`, submit a message
//! - **`get_messages`** - `GET /getMessages`, read the ordered feed
//!
//! Both are mounted with `any()` and check the method themselves, answering
//! a wrong verb with `405` and the feed's JSON error body.
//!
//! # Example
//!
//! ```rust,no_run
//! use feedsync::backend::chat::handlers::{handle_add_message, handle_get_messages};
//! use feedsync::backend::server::state::AppState;
//! use axum::{routing::any, Router};
//!
//! # fn example(state: AppState) {
//! let router: Router = Router::new()
//!     .route("/addMessage", any(handle_add_message))
//!     .route("/getMessages", any(handle_get_messages))
//!     .with_state(state);
//! # }
//! ```

/// Submission handler
pub mod add_message;

/// Snapshot handler
pub mod get_messages;

pub use add_message::handle_add_message;
pub use get_messages::handle_get_messages;
