/**
 * Fan-out Event System
 *
 * This module defines the events announced on the fan-out bus. There is a
 * single topic (`messages`) and a single event type (`new-message`) whose
 * payload is the JSON-serialized confirmed `Message`, the same shape as the
 * `message` field of the `POST /addMessage` response.
 *
 * On the wire (Server-Sent Events) an announcement looks like:
 *
 * ```text
 * event: new-message
 * data: {"id":"...","text":"...","createdAt":1700000000000,"author":{...}}
 * ```
 */
use crate::shared::error::SharedError;
use crate::shared::message::Message;
use serde::{Deserialize, Serialize};

/// The only topic the feed publishes on
pub const MESSAGES_TOPIC: &str = "messages";

/// Event name for a newly confirmed message
pub const NEW_MESSAGE_EVENT: &str = "new-message";

/// Event delivered to every live subscriber of a topic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum FeedEvent {
    /// A message was persisted and announced
    NewMessage(Message),
}

impl FeedEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => NEW_MESSAGE_EVENT,
        }
    }

    /// The message carried by the event
    pub fn message(&self) -> &Message {
        match self {
            Self::NewMessage(message) => message,
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            Self::NewMessage(message) => message,
        }
    }

    /// Serialize only the payload, as sent in an SSE `data:` line
    pub fn payload_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self.message())?)
    }

    /// Rebuild an event from an SSE frame
    ///
    /// Returns `Ok(None)` for event names this client does not know about,
    /// so newer servers can add events without breaking older readers.
    pub fn from_frame(name: &str, data: &str) -> Result<Option<Self>, SharedError> {
        match name {
            NEW_MESSAGE_EVENT => Ok(Some(Self::NewMessage(serde_json::from_str(data)?))),
            _ => Ok(None),
        }
    }
}
