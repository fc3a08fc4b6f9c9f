/**
 * Publish Gateway
 *
 * The single write path of the feed. `accept` turns a raw submission into a
 * confirmed message:
 *
 * 1. Validate the payload and the caller identity. Nothing is touched when
 *    this fails.
 * 2. Stamp `createdAt` from the server clock, overwriting whatever the client
 *    sent.
 * 3. Persist with `store.put(id, message)`. On failure nothing is announced.
 * 4. Announce `new-message` on the `messages` topic, at most once. Delivery is
 *    best effort; a failed publish is logged and does not fail the request.
 *
 * Requests are not serialized against each other. Two accepts for the same id
 * race at the store, where the later put wins.
 */
use crate::backend::realtime::Publisher;
use crate::backend::store::{SharedStore, StoreError};
use crate::shared::{Author, Clock, FeedEvent, IncomingMessage, Message, SharedError, MESSAGES_TOPIC};
use std::sync::Arc;
use thiserror::Error;

/// Why a submission was not accepted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The payload or identity failed validation; nothing was written
    #[error(transparent)]
    InvalidRequest(SharedError),

    /// The store refused the write; nothing was announced
    #[error(transparent)]
    StoreUnavailable(StoreError),
}

/// Validates, timestamps, persists and announces new messages
#[derive(Clone)]
pub struct PublishGateway {
    store: SharedStore,
    publisher: Arc<dyn Publisher>,
    clock: Arc<dyn Clock>,
}

impl PublishGateway {
    pub fn new(store: SharedStore, publisher: Arc<dyn Publisher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            publisher,
            clock,
        }
    }

    /// Accept a submission from `identity`
    ///
    /// Returns the confirmed message exactly as stored and announced.
    pub async fn accept(
        &self,
        raw: IncomingMessage,
        identity: Option<Author>,
    ) -> Result<Message, GatewayError> {
        let submission = raw.into_submission(identity).map_err(|e| {
            tracing::warn!("[Gateway] Rejected submission: {}", e);
            GatewayError::InvalidRequest(e)
        })?;

        let message = submission.confirm(self.clock.now_millis());

        if let Err(e) = self.store.put(&message.id, &message).await {
            tracing::error!(
                "[Gateway] Failed to persist message {} to {} store: {}",
                message.id,
                self.store.backend_name(),
                e
            );
            return Err(GatewayError::StoreUnavailable(e));
        }

        tracing::info!(
            "[Gateway] Accepted message {} from {} at {}",
            message.id,
            message.author.identity_key,
            message.created_at
        );

        match self
            .publisher
            .publish(MESSAGES_TOPIC, FeedEvent::NewMessage(message.clone()))
        {
            Ok(count) => {
                tracing::debug!("[Gateway] Announced message {} to {} subscribers", message.id, count);
            }
            Err(e) => {
                tracing::warn!("[Gateway] Failed to announce message {}: {}", message.id, e);
            }
        }

        Ok(message)
    }
}

impl std::fmt::Debug for PublishGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishGateway")
            .field("store", &self.store.backend_name())
            .finish_non_exhaustive()
    }
}
