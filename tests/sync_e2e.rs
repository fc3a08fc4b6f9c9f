//! End-to-end synchronization over real HTTP and Server-Sent Events
//!
//! Healthy paths run against a feedsync server on an ephemeral port;
//! failure paths run against `wiremock` stand-ins.
#![cfg(feature = "ssr")]

mod common;

use assert_matches::assert_matches;
use common::*;
use feedsync::backend::server::build_state;
use feedsync::backend::store::{MemoryStore, SqliteStore};
use feedsync::client::transport::HttpGateway;
use feedsync::client::{CacheMutation, ClientSyncEngine, SyncError, SyncPhase, ViewerSession};
use feedsync::shared::{
    AppConfig, Author, FeedEvent, ManualClock, StaticIdentity, MESSAGES_TOPIC,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn config(base_url: &str, accept_timeout: Duration) -> AppConfig {
    AppConfig::builder()
        .server_url(base_url)
        .accept_timeout(accept_timeout)
        .build()
        .unwrap()
}

fn signed_in(author: Author) -> Arc<StaticIdentity> {
    Arc::new(StaticIdentity::signed_in(author))
}

/// An HTTP engine with its own clock, not yet initialized
fn http_engine(base_url: &str, author: Author, viewer_time: i64, timeout: Duration) -> (Arc<HttpGateway>, ClientSyncEngine) {
    let http = Arc::new(HttpGateway::new(&config(base_url, timeout)).unwrap());
    let engine = ClientSyncEngine::new(http.clone(), http.clone(), signed_in(author))
        .with_clock(Arc::new(ManualClock::fixed(viewer_time)))
        .with_accept_timeout(timeout);
    (http, engine)
}

async fn http_viewer(base_url: &str, author: Author, viewer_time: i64) -> ViewerSession {
    let (http, engine) = http_engine(base_url, author, viewer_time, Duration::from_secs(5));
    let subscription = http.subscribe().await.unwrap();
    ViewerSession::start(Arc::new(engine), Box::new(subscription)).await.unwrap()
}

async fn wait_for_subscribers(server: &TestServer, count: usize) {
    let bus = server.state.bus.clone();
    eventually(|| {
        let bus = bus.clone();
        async move { bus.subscriber_count(MESSAGES_TOPIC) == count }
    })
    .await;
}

#[tokio::test]
async fn test_two_http_viewers_converge() {
    let (state, _store) = memory_state(5_000);
    let server = TestServer::spawn(state).await;

    let mut alice_view = http_viewer(&server.base_url, alice(), 1_000).await;
    let mut bob_view = http_viewer(&server.base_url, bob(), 1_000).await;
    wait_for_subscribers(&server, 2).await;

    let confirmed = assert_ok!(alice_view.engine().submit("hi bob").await);
    assert_eq!(confirmed.created_at, 5_000);

    let bob_engine = bob_view.engine().clone();
    eventually(|| {
        let engine = bob_engine.clone();
        async move { engine.messages().await.len() == 1 }
    })
    .await;

    assert_eq!(bob_view.engine().messages().await, vec![confirmed.clone()]);
    assert_eq!(alice_view.engine().messages().await, vec![confirmed]);

    alice_view.teardown().await;
    bob_view.teardown().await;
    wait_for_subscribers(&server, 0).await;
}

#[tokio::test]
async fn test_server_time_replaces_viewer_time() {
    let (state, _store) = memory_state(5_000);
    let server = TestServer::spawn(state).await;
    let (_http, engine) = http_engine(&server.base_url, alice(), 1_000, Duration::from_secs(5));
    engine.initialize().await.unwrap();

    let confirmed = engine.submit("clock skew").await.unwrap();

    let feed = engine.messages().await;
    assert_eq!(feed[0].id, confirmed.id);
    assert_eq!(feed[0].created_at, 5_000);
    assert!(engine.entries().await.iter().all(|entry| !entry.provisional));
}

#[tokio::test]
async fn test_delivery_lands_in_feed_order() {
    let store = Arc::new(MemoryStore::with_messages(vec![message("new", 300), message("old", 100)]));
    let state = build_state(store, Arc::new(ManualClock::fixed(5_000)), 16);
    let server = TestServer::spawn(state).await;

    let mut bob_view = http_viewer(&server.base_url, bob(), 1_000).await;
    wait_for_subscribers(&server, 1).await;

    let delivered = server
        .state
        .bus
        .send(MESSAGES_TOPIC, FeedEvent::NewMessage(message("middle", 200)))
        .unwrap();
    assert_eq!(delivered, 1);

    let engine = bob_view.engine().clone();
    eventually(|| {
        let engine = engine.clone();
        async move { engine.messages().await.len() == 3 }
    })
    .await;

    assert_eq!(ids(&bob_view.engine().messages().await), vec!["new", "middle", "old"]);
    bob_view.teardown().await;
}

#[tokio::test]
async fn test_store_unavailable_rolls_back() {
    let mock = mock_feed_server(vec![message("a", 300), message("b", 100)]).await;
    fail_add_message(&mock, 503, "store_unavailable").await;

    let (_http, engine) = http_engine(&mock.uri(), alice(), 1_000, Duration::from_secs(5));
    engine.initialize().await.unwrap();
    let before = engine.messages().await;

    let result = engine.submit("doomed").await;

    assert_err!(result, SyncError::StoreUnavailable(_));
    assert_eq!(engine.messages().await, before);
    assert_eq!(engine.phase().await, SyncPhase::Synced);
    assert_matches!(engine.mutations().await.last(), Some(CacheMutation::RolledBack { .. }));
    assert_eq!(request_count(&mock, "/addMessage").await, 1);
}

#[tokio::test]
async fn test_slow_gateway_times_out_and_rolls_back() {
    let mock = mock_feed_server(vec![message("a", 300)]).await;
    delay_add_message(&mock, Duration::from_secs(2)).await;

    let timeout = Duration::from_millis(200);
    let (_http, engine) = http_engine(&mock.uri(), alice(), 1_000, timeout);
    engine.initialize().await.unwrap();

    let result = engine.submit("slow").await;

    assert_matches!(result, Err(SyncError::Timeout(t)) if t == timeout);
    assert_eq!(ids(&engine.messages().await), vec!["a"]);
    assert_eq!(engine.phase().await, SyncPhase::Synced);
}

#[tokio::test]
async fn test_rejected_submission_rolls_back() {
    let mock = mock_feed_server(Vec::new()).await;
    fail_add_message(&mock, 400, "invalid_request").await;

    let (_http, engine) = http_engine(&mock.uri(), alice(), 1_000, Duration::from_secs(5));
    engine.initialize().await.unwrap();

    let result = engine.submit("nope").await;

    match result {
        Err(SyncError::Rejected(reason)) => assert_contains!(reason, "mocked failure"),
        other => panic!("expected Rejected, got {:?}", other),
    }
    assert!(engine.messages().await.is_empty());
}

#[tokio::test]
async fn test_sqlite_feed_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("feed.db").display());

    let confirmed = {
        let store = Arc::new(SqliteStore::connect(&url).await.unwrap());
        let server = TestServer::spawn(build_state(store.clone(), Arc::new(ManualClock::fixed(7_000)), 16)).await;
        let (_http, engine) = http_engine(&server.base_url, alice(), 1_000, Duration::from_secs(5));
        engine.initialize().await.unwrap();
        let confirmed = engine.submit("still here").await.unwrap();
        drop(server);
        store.close().await;
        confirmed
    };

    let store = Arc::new(SqliteStore::connect(&url).await.unwrap());
    let server = TestServer::spawn(build_state(store, Arc::new(ManualClock::fixed(9_000)), 16)).await;
    let (_http, engine) = http_engine(&server.base_url, bob(), 1_000, Duration::from_secs(5));
    engine.initialize().await.unwrap();

    assert_eq!(engine.messages().await, vec![confirmed]);
}
