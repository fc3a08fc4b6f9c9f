//! Server Module
//!
//! Server initialization, application state, and configuration.
//!
//! - **`state`** - `AppState` and its `FromRef` projections
//! - **`config`** - `ServerConfig`, read from the environment
//! - **`init`** - building the services and the router
//!
//! # Example
//!
//! ```rust,no_run
//! use feedsync::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() {
//! let config = ServerConfig::from_env().unwrap();
//! let app = create_app(&config).await.unwrap();
//! let listener = tokio::net::TcpListener::bind(config.socket_addr()).await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::{build_state, create_app, create_app_with_state};
pub use state::AppState;
