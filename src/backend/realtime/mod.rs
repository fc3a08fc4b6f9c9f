//! Real-time Fan-out Module
//!
//! Announces confirmed messages to live subscribers.
//!
//! - **`broadcast`** - `FanoutBus`, the in-process topic bus, and the
//!   `Publisher` seam the gateway publishes through
//! - **`subscription`** - `GET /subscribe`, relaying bus events as
//!   Server-Sent Events

pub mod broadcast;
pub mod subscription;

pub use broadcast::{FanoutBus, FanoutError, Publisher, Subscription, DEFAULT_CAPACITY};
pub use subscription::{handle_feed_subscription, SubscribeQuery};
