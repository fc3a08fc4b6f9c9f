//! # HTTP Transport
//!
//! `reqwest`-based access to a feedsync server.
//!
//! - [`HttpGateway`] - `POST /addMessage` and `GET /getMessages`
//! - [`SseSubscription`] - `GET /subscribe?topic=messages`, read in a
//!   background task and handed out one `FeedEvent` at a time
//!
//! ## Status Mapping
//!
//! | Response | `SyncError` |
//! |----------|-------------|
//! | 4xx | `Rejected` |
//! | 5xx | `StoreUnavailable` |
//! | no response or malformed body | `Transport` |

use crate::client::error::SyncError;
use crate::client::remote::{FeedGateway, FeedSource, FeedSubscription};
use crate::shared::{
    AddMessageRequest, AddMessageResponse, AppConfig, FeedEvent, GetMessagesResponse,
    IncomingMessage, Message, MESSAGES_TOPIC,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Deliveries buffered between the reader task and the consumer
const EVENT_BUFFER: usize = 256;

/// JSON error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    body: String,
}

/// Client for the feed's HTTP endpoints
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &AppConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.server_url.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Open a live subscription to the `messages` topic
    pub async fn subscribe(&self) -> Result<SseSubscription, SyncError> {
        SseSubscription::connect(&self.client, &self.base_url).await
    }
}

#[async_trait]
impl FeedGateway for HttpGateway {
    async fn accept(&self, provisional: &Message) -> Result<Message, SyncError> {
        let request = AddMessageRequest {
            message: IncomingMessage::from(provisional),
        };

        let response = self
            .client
            .post(self.url("/addMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let response = check_status(response).await?;
        let body: AddMessageResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Transport(format!("malformed response: {}", e)))?;
        Ok(body.message)
    }
}

#[async_trait]
impl FeedSource for HttpGateway {
    async fn snapshot(&self) -> Result<Vec<Message>, SyncError> {
        let response = self
            .client
            .get(self.url("/getMessages"))
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let response = check_status(response).await?;
        let body: GetMessagesResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Transport(format!("malformed response: {}", e)))?;
        Ok(body.messages)
    }
}

/// Pass successful responses through, turn the rest into `SyncError`
async fn check_status(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.body)
        .ok()
        .filter(|body| !body.is_empty())
        .unwrap_or(text);
    let message = format!("{}: {}", status, message);

    Err(match status {
        s if s.is_server_error() => SyncError::StoreUnavailable(message),
        s if s.is_client_error() => SyncError::Rejected(message),
        _ => SyncError::Transport(message),
    })
}

/// One dispatched Server-Sent Events frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental parser for `text/event-stream` bodies
///
/// Feed it chunks as they arrive; it returns every frame completed by the
/// chunk. Lines may be split across chunks and may end in `\n` or `\r\n`.
#[derive(Debug, Default)]
pub struct SseFrameParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseFrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches('\n').trim_end_matches('\r');
            if let Some(frame) = self.process_line(line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry are not used by this client
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// Live `messages` subscription over Server-Sent Events
///
/// The response body is read by a spawned task. `unsubscribe` aborts that
/// task, which drops the connection and releases the server-side
/// registration; it also runs on `Drop`.
#[derive(Debug)]
pub struct SseSubscription {
    events: mpsc::Receiver<FeedEvent>,
    reader: Option<JoinHandle<()>>,
}

impl SseSubscription {
    /// Connect and wait until the server has registered the subscription
    pub async fn connect(client: &Client, base_url: &str) -> Result<Self, SyncError> {
        let response = client
            .get(format!("{}/subscribe", base_url))
            .query(&[("topic", MESSAGES_TOPIC)])
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let response = check_status(response).await?;

        tracing::info!("[Sync] SSE subscription established");

        let (sender, events) = mpsc::channel(EVENT_BUFFER);
        let reader = tokio::spawn(read_events(response, sender));

        Ok(Self {
            events,
            reader: Some(reader),
        })
    }

    pub fn is_active(&self) -> bool {
        self.reader.is_some()
    }
}

async fn read_events(response: Response, sender: mpsc::Sender<FeedEvent>) {
    let mut stream = response.bytes_stream();
    let mut parser = SseFrameParser::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!("[Sync] Error reading from SSE stream: {}", e);
                return;
            }
        };

        for frame in parser.push(&chunk) {
            match FeedEvent::from_frame(&frame.event, &frame.data) {
                Ok(Some(event)) => {
                    if sender.send(event).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    tracing::debug!("[Sync] Ignoring SSE event '{}'", frame.event);
                }
                Err(e) => {
                    tracing::warn!("[Sync] Failed to parse SSE data: {}", e);
                }
            }
        }
    }

    tracing::info!("[Sync] SSE stream closed by server");
}

#[async_trait]
impl FeedSubscription for SseSubscription {
    async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }

    fn unsubscribe(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
            self.events.close();
            tracing::debug!("[Sync] SSE subscription released");
        }
    }
}

impl Drop for SseSubscription {
    fn drop(&mut self) {
        FeedSubscription::unsubscribe(self);
    }
}
