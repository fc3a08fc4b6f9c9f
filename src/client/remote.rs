//! # Remote Feed Seams
//!
//! The engine talks to the server through three small traits so the same
//! engine runs over HTTP, in-process against a backend, or against fakes:
//!
//! - [`FeedGateway`] - submit a provisional message, get the confirmed one back
//! - [`FeedSource`] - fetch an ordered snapshot
//! - [`FeedSubscription`] - receive fan-out deliveries until unsubscribed
//!
//! `LocalFeed` (with the `ssr` feature) adapts a `PublishGateway`,
//! `QueryService` and `FanoutBus` living in the same process.

use crate::client::error::SyncError;
use crate::shared::{FeedEvent, Message};
use async_trait::async_trait;

/// Submission endpoint
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// Ask the server to confirm `provisional`
    async fn accept(&self, provisional: &Message) -> Result<Message, SyncError>;
}

/// Snapshot endpoint
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Every confirmed message in feed order
    async fn snapshot(&self) -> Result<Vec<Message>, SyncError>;
}

/// Live delivery of fan-out events
#[async_trait]
pub trait FeedSubscription: Send {
    /// Next delivered event, or `None` once the subscription has ended
    async fn next_event(&mut self) -> Option<FeedEvent>;

    /// Release the registration; calling it again does nothing
    fn unsubscribe(&mut self);
}

#[cfg(feature = "ssr")]
mod local {
    use super::*;
    use crate::backend::chat::{GatewayError, PublishGateway, QueryService};
    use crate::backend::realtime::{FanoutBus, FanoutError, Subscription};
    use crate::shared::{IncomingMessage, MESSAGES_TOPIC};
    use std::sync::Arc;

    /// In-process access to a backend
    #[derive(Debug, Clone)]
    pub struct LocalFeed {
        gateway: Arc<PublishGateway>,
        query: QueryService,
        bus: FanoutBus,
    }

    impl LocalFeed {
        pub fn new(gateway: Arc<PublishGateway>, query: QueryService, bus: FanoutBus) -> Self {
            Self { gateway, query, bus }
        }

        pub fn subscribe(&self) -> Result<Subscription, FanoutError> {
            self.bus.subscribe(MESSAGES_TOPIC)
        }
    }

    #[async_trait]
    impl FeedGateway for LocalFeed {
        async fn accept(&self, provisional: &Message) -> Result<Message, SyncError> {
            let raw = IncomingMessage::from(provisional);
            self.gateway
                .accept(raw, Some(provisional.author.clone()))
                .await
                .map_err(|e| match e {
                    GatewayError::InvalidRequest(err) => SyncError::Rejected(err.to_string()),
                    GatewayError::StoreUnavailable(err) => SyncError::StoreUnavailable(err.to_string()),
                })
        }
    }

    #[async_trait]
    impl FeedSource for LocalFeed {
        async fn snapshot(&self) -> Result<Vec<Message>, SyncError> {
            self.query
                .snapshot()
                .await
                .map_err(|e| SyncError::StoreUnavailable(e.to_string()))
        }
    }

    #[async_trait]
    impl FeedSubscription for Subscription {
        async fn next_event(&mut self) -> Option<FeedEvent> {
            self.recv().await
        }

        fn unsubscribe(&mut self) {
            Subscription::unsubscribe(self);
        }
    }
}

#[cfg(feature = "ssr")]
pub use local::LocalFeed;
