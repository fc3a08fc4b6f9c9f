/**
 * Feed Subscription Handler
 *
 * Server-Sent Events endpoint (`GET /subscribe?topic=messages`) that relays
 * fan-out events to HTTP subscribers.
 *
 * # Connection Management
 *
 * - The fan-out registration is taken before the response headers are sent,
 *   so a client that has seen `200 OK` will receive every later event
 * - Keep-alive comment lines are injected by axum while the feed is quiet
 * - When the client goes away the stream is dropped, which drops the
 *   `Subscription` and releases its registration
 * - Lagged events are logged but don't cause connection drops
 */
use crate::backend::error::BackendError;
use crate::backend::realtime::broadcast::{FanoutBus, Subscription};
use crate::shared::MESSAGES_TOPIC;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;

/// Query string of `GET /subscribe`
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    /// Topic to follow; defaults to `messages`
    pub topic: Option<String>,
}

/// Handle feed subscription (GET /subscribe)
///
/// # Errors
///
/// * `400 Bad Request` - If `topic` names anything other than `messages`
///
/// # Example Response
///
/// ```http
/// HTTP/1.1 200 OK
/// Content-Type: text/event-stream
///
/// event: new-message
/// data: {"id":"...","text":"hi","createdAt":1700000000000,"author":{...}}
/// ```
pub async fn handle_feed_subscription(
    State(bus): State<FanoutBus>,
    Query(query): Query<SubscribeQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, BackendError> {
    let topic = query.topic.as_deref().unwrap_or(MESSAGES_TOPIC).trim();
    if topic != MESSAGES_TOPIC {
        tracing::warn!("[Fanout] Rejected subscription to unknown topic '{}'", topic);
        return Err(BackendError::invalid_request(format!(
            "unknown topic '{}', only '{}' is available",
            topic, MESSAGES_TOPIC
        )));
    }

    let subscription = bus.subscribe(topic)?;
    tracing::info!(
        "[Fanout] SSE subscriber joined '{}' ({} live)",
        topic,
        bus.subscriber_count(topic)
    );

    Ok(Sse::new(event_stream(subscription)).keep_alive(KeepAlive::default()))
}

/// Turn a fan-out subscription into a stream of SSE frames
///
/// Ends when the subscription does. Events that fail to serialize are skipped.
fn event_stream(subscription: Subscription) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold(subscription, |mut subscription| async move {
        loop {
            let event = subscription.recv().await?;
            match event.payload_json() {
                Ok(data) => {
                    tracing::debug!(
                        "[Fanout] Relaying {} for message {}",
                        event.name(),
                        event.message().id
                    );
                    let frame = Event::default().event(event.name()).data(data);
                    return Some((Ok(frame), subscription));
                }
                Err(e) => {
                    tracing::error!("[Fanout] Failed to serialize event: {:?}", e);
                    continue;
                }
            }
        }
    })
}
