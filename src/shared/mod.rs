//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the sync client and the backend. These types are used for serialization
//! and communication over the HTTP API and the fan-out stream.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code:
//!
//! - **`message`** - The feed `Message`, its author, wire envelopes and the
//!   authoritative ordering rule
//! - **`event`** - Fan-out events (`new-message` on the `messages` topic)
//! - **`identity`** - Identity provider and id generator collaborators
//! - **`clock`** - Millisecond clocks used for timestamps
//! - **`error`** - Validation and serialization errors
//! - **`config`** - Client-facing application configuration

/// Message data structure and ordering
pub mod message;

/// Fan-out event system
pub mod event;

/// Identity and id generation collaborators
pub mod identity;

/// Epoch-millisecond clocks
pub mod clock;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use message::{
    feed_order, sort_feed, AddMessageRequest, AddMessageResponse, Author, GetMessagesResponse,
    IncomingMessage, Message, Submission,
};
pub use event::{FeedEvent, MESSAGES_TOPIC, NEW_MESSAGE_EVENT};
pub use identity::{IdGenerator, IdentityProvider, StaticIdentity, UuidIdGenerator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
