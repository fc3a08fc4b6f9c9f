//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Fixtures (authors, messages, app state)
//! - Fake stores and publishers
//! - A real server bound to an ephemeral port
//! - `wiremock` helpers
//! - Custom assertion macros
#![allow(dead_code)]

pub mod assertions;
pub mod mock_server;

pub use assertions::*;
pub use mock_server::*;

use async_trait::async_trait;
use feedsync::backend::chat::{PublishGateway, QueryService};
use feedsync::backend::realtime::{FanoutBus, FanoutError, Publisher};
use feedsync::backend::server::{build_state, create_app_with_state, AppState};
use feedsync::backend::store::{MemoryStore, MessageStore, SharedStore, StoreError};
use feedsync::shared::{Author, Clock, FeedEvent, ManualClock, Message};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

pub fn alice() -> Author {
    Author::new("Alice", "https://example.com/alice.png", "alice@example.com")
}

pub fn bob() -> Author {
    Author::new("Bob", "https://example.com/bob.png", "bob@example.com")
}

pub fn message(id: &str, created_at: i64) -> Message {
    Message::new(id, format!("text of {}", id), created_at, alice())
}

/// Store that refuses every operation
pub struct FailingStore;

#[async_trait]
impl MessageStore for FailingStore {
    async fn put(&self, _id: &str, _message: &Message) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn get_all(&self) -> Result<Vec<Message>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

/// Publisher that remembers every event
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<FeedEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<FeedEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, _topic: &str, event: FeedEvent) -> Result<usize, FanoutError> {
        self.events.lock().unwrap().push(event);
        Ok(1)
    }
}

/// App state whose gateway publishes into a `RecordingPublisher`
pub fn recording_state(store: SharedStore, clock: Arc<dyn Clock>) -> (AppState, Arc<RecordingPublisher>) {
    let publisher = Arc::new(RecordingPublisher::default());
    let state = AppState {
        gateway: Arc::new(PublishGateway::new(store.clone(), publisher.clone(), clock)),
        query: QueryService::new(store.clone()),
        bus: FanoutBus::default(),
        store,
    };
    (state, publisher)
}

/// Memory-backed state with a fixed server clock
pub fn memory_state(server_time: i64) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(store.clone(), Arc::new(ManualClock::fixed(server_time)), 64);
    (state, store)
}

/// A real server on 127.0.0.1 with an ephemeral port
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(state: AppState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_app_with_state(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Poll `check` until it returns true, failing after five seconds
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}
