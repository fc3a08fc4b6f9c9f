/**
 * Message Data Structure
 *
 * This module defines the feed `Message`, the author identity attached to it,
 * and the request/response envelopes used by the HTTP API.
 *
 * The Message struct is shared between the client and the backend, allowing
 * the same JSON shape over `POST /addMessage`, `GET /getMessages` and the
 * `new-message` fan-out event.
 *
 * # Ordering
 *
 * The feed has exactly one authoritative order: `createdAt` descending, with
 * ascending `id` breaking ties between equal timestamps. Both the query
 * service and every client cache sort with [`feed_order`].
 *
 * # Validation
 *
 * Raw payloads arrive as [`IncomingMessage`], where every field is optional.
 * [`IncomingMessage::into_submission`] turns one into a [`Submission`] or a
 * `SharedError::ValidationError`. A `Submission` has no timestamp; the only
 * way to get a `Message` out of it is [`Submission::confirm`], which takes
 * the server-assigned `createdAt`.
 */
use crate::shared::error::SharedError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Maximum accepted message length in bytes
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Maximum accepted display name length in bytes
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Maximum accepted message id length in bytes
pub const MAX_ID_LENGTH: usize = 200;

/// Identity of the person who wrote a message
///
/// Supplied by the external identity collaborator; the core treats it as
/// opaque. Every field defaults to empty when missing on the wire so that a
/// partial author is reported as a validation error rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Human-readable name
    #[serde(default)]
    pub display_name: String,
    /// Profile image location
    #[serde(default)]
    pub avatar_url: String,
    /// Stable key identifying the author (e.g. an email address)
    #[serde(default)]
    pub identity_key: String,
}

impl Author {
    pub fn new(
        display_name: impl Into<String>,
        avatar_url: impl Into<String>,
        identity_key: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            avatar_url: avatar_url.into(),
            identity_key: identity_key.into(),
        }
    }

    /// An author without an identity key counts as no identity at all
    pub fn is_present(&self) -> bool {
        !self.identity_key.trim().is_empty()
    }
}

/// A single feed message
///
/// # Fields
/// * `id` - Globally unique id chosen by the submitting client
/// * `text` - Non-empty message content
/// * `created_at` - Epoch milliseconds; authoritative once confirmed by the server
/// * `author` - Identity of the writer
///
/// # Example
/// ```rust
/// use feedsync::shared::{Author, Message};
///
/// let author = Author::new("Alice", "https://example.com/a.png", "alice@example.com");
/// let message = Message::new("m-1", "Hello, world!", 1_000, author);
/// assert_eq!(message.created_at, 1_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub created_at: i64,
    pub author: Author,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        created_at: i64,
        author: Author,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            created_at,
            author,
        }
    }
}

/// Authoritative feed order: newest first, ties broken by ascending id
pub fn feed_order(a: &Message, b: &Message) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort messages in place into authoritative feed order
pub fn sort_feed(messages: &mut [Message]) {
    messages.sort_by(feed_order);
}

/// Check that text is non-empty and within limits
pub fn validate_text(text: &str) -> Result<(), SharedError> {
    if text.trim().is_empty() {
        return Err(SharedError::validation("text", "message text cannot be empty"));
    }
    if text.len() > MAX_TEXT_LENGTH {
        return Err(SharedError::validation(
            "text",
            format!("message text exceeds {} bytes", MAX_TEXT_LENGTH),
        ));
    }
    Ok(())
}

/// A message as it arrives over the wire, before validation
///
/// Any client-supplied `createdAt` is accepted in whatever JSON shape it
/// arrives and discarded; it never reaches a stored message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl IncomingMessage {
    /// Validate the raw payload against the caller identity
    ///
    /// The identity is passed separately because it comes from the identity
    /// collaborator, not from the message body; it becomes the author of the
    /// resulting submission.
    pub fn into_submission(self, identity: Option<Author>) -> Result<Submission, SharedError> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| SharedError::validation("id", "message id is required"))?;

        // ids are stored exactly as sent
        if id.trim() != id {
            return Err(SharedError::validation(
                "id",
                "message id has leading or trailing whitespace",
            ));
        }

        if id.len() > MAX_ID_LENGTH {
            return Err(SharedError::validation(
                "id",
                format!("message id exceeds {} bytes", MAX_ID_LENGTH),
            ));
        }
        if id.chars().any(char::is_control) {
            return Err(SharedError::validation("id", "message id contains control characters"));
        }

        let text = self
            .text
            .ok_or_else(|| SharedError::validation("text", "message text is required"))?;
        validate_text(&text)?;

        let author = identity
            .filter(Author::is_present)
            .ok_or_else(|| SharedError::validation("author", "caller identity is required"))?;

        if author.display_name.len() > MAX_DISPLAY_NAME_LENGTH {
            return Err(SharedError::validation(
                "author.displayName",
                format!("display name exceeds {} bytes", MAX_DISPLAY_NAME_LENGTH),
            ));
        }

        Ok(Submission { id, text, author })
    }
}

impl From<&Message> for IncomingMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: Some(message.id.clone()),
            text: Some(message.text.clone()),
            created_at: Some(message.created_at.into()),
            author: Some(message.author.clone()),
        }
    }
}

/// A validated message waiting for its authoritative timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: String,
    pub text: String,
    pub author: Author,
}

impl Submission {
    /// Stamp the submission with the server clock, producing a confirmed message
    pub fn confirm(self, created_at: i64) -> Message {
        Message {
            id: self.id,
            text: self.text,
            created_at,
            author: self.author,
        }
    }
}

/// Body of `POST /addMessage`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddMessageRequest {
    pub message: IncomingMessage,
}

/// Successful response of `POST /addMessage`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddMessageResponse {
    pub message: Message,
}

/// Successful response of `GET /getMessages`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetMessagesResponse {
    pub messages: Vec<Message>,
}
