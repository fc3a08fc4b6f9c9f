/**
 * Fan-out Bus
 *
 * This module provides the topic-based publish/subscribe channel that
 * announces confirmed messages to every live subscriber.
 *
 * # Broadcasting
 *
 * Each topic is backed by its own `tokio::sync::broadcast` channel, created
 * lazily on first use. All subscribers receive a copy of each event.
 *
 * # Delivery Guarantees
 *
 * There are none beyond "live subscribers at publish time". Events are not
 * persisted: a subscriber that joins after a publish never sees it, and a
 * subscriber that falls more than `capacity` events behind skips the oldest
 * ones. Both cases are silent to the publisher; a lagging subscriber logs how
 * many events it lost. Readers recover by re-reading the feed snapshot.
 *
 * # Subscriptions
 *
 * `subscribe` returns a [`Subscription`] handle. `unsubscribe` is idempotent
 * and also runs on `Drop`, so a registration is released on every exit path.
 */
use crate::shared::FeedEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::broadcast;

/// Default per-topic buffer, in events
pub const DEFAULT_CAPACITY: usize = 1000;

/// Fan-out errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FanoutError {
    /// Topic names must be non-blank
    #[error("invalid fan-out topic '{0}'")]
    InvalidTopic(String),
}

/// Anything the gateway can announce confirmed messages through
///
/// `FanoutBus` is the production implementation; tests substitute fakes that
/// record or fail.
pub trait Publisher: Send + Sync {
    /// Deliver `event` to every live subscriber of `topic`
    ///
    /// Returns how many subscribers were live. Zero is not an error.
    fn publish(&self, topic: &str, event: FeedEvent) -> Result<usize, FanoutError>;
}

/// Topic-based broadcast bus
///
/// Cheap to clone; clones share the same topics.
///
/// # Example
///
/// ```rust
/// use feedsync::backend::realtime::FanoutBus;
/// use feedsync::shared::{Author, FeedEvent, Message, MESSAGES_TOPIC};
///
/// # async fn example() {
/// let bus = FanoutBus::new(16);
/// let mut subscription = bus.subscribe(MESSAGES_TOPIC).unwrap();
///
/// let message = Message::new("m-1", "hi", 1, Author::new("Alice", "", "alice@example.com"));
/// bus.send(MESSAGES_TOPIC, FeedEvent::NewMessage(message)).unwrap();
///
/// let event = subscription.recv().await.unwrap();
/// assert_eq!(event.message().id, "m-1");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FanoutBus {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<FeedEvent>>>>,
    capacity: usize,
}

impl FanoutBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<FeedEvent>>> {
        // a panic while holding the lock cannot leave the map half-written
        self.channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a live subscription on `topic`
    pub fn subscribe(&self, topic: &str) -> Result<Subscription, FanoutError> {
        let topic = normalize_topic(topic)?;
        let receiver = self
            .channels()
            .entry(topic.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        tracing::debug!("[Fanout] New subscription on '{}'", topic);

        Ok(Subscription {
            topic,
            receiver: Some(receiver),
            lost_events: 0,
        })
    }

    /// Deliver `event` to every live subscriber of `topic`
    pub fn send(&self, topic: &str, event: FeedEvent) -> Result<usize, FanoutError> {
        let topic = normalize_topic(topic)?;
        let sender = self.channels().get(&topic).cloned();

        let Some(sender) = sender else {
            tracing::debug!("[Fanout] No subscribers have ever joined '{}'", topic);
            return Ok(0);
        };

        match sender.send(event) {
            Ok(subscriber_count) => {
                tracing::info!(
                    "[Fanout] Event broadcast on '{}' to {} subscribers",
                    topic,
                    subscriber_count
                );
                Ok(subscriber_count)
            }
            Err(e) => {
                // No subscribers, that's okay
                tracing::debug!("[Fanout] No subscribers to receive event: {:?}", e.0.name());
                Ok(0)
            }
        }
    }

    /// Number of live subscriptions on `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.channels()
            .get(topic.trim())
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }

    /// Drop channels nobody listens to any more
    pub fn prune_idle_topics(&self) -> usize {
        let mut channels = self.channels();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }
}

impl Default for FanoutBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Publisher for FanoutBus {
    fn publish(&self, topic: &str, event: FeedEvent) -> Result<usize, FanoutError> {
        self.send(topic, event)
    }
}

fn normalize_topic(topic: &str) -> Result<String, FanoutError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(FanoutError::InvalidTopic(topic.to_string()));
    }
    Ok(trimmed.to_string())
}

/// A live registration on one topic
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    receiver: Option<broadcast::Receiver<FeedEvent>>,
    lost_events: u64,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether the subscription is still registered
    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    /// Events skipped because this subscriber lagged behind
    pub fn lost_events(&self) -> u64 {
        self.lost_events
    }

    /// Wait for the next event
    ///
    /// Returns `None` once unsubscribed or once the bus is gone. Lagging is
    /// not an error: the skipped events are counted and waiting continues.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    self.lost_events += skipped;
                    tracing::warn!(
                        "[Fanout] Subscriber on '{}' lagged, skipped {} events",
                        self.topic,
                        skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("[Fanout] Channel '{}' closed, ending subscription", self.topic);
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Release the registration; calling it again does nothing
    pub fn unsubscribe(&mut self) {
        if self.receiver.take().is_some() {
            tracing::debug!("[Fanout] Unsubscribed from '{}'", self.topic);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
