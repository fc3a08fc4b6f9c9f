//! Mock server helpers for integration tests
//!
//! `wiremock` stand-ins for a feedsync server that misbehaves: store down,
//! slow to answer, or rejecting input.

use feedsync::shared::{GetMessagesResponse, Message};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock server whose `GET /getMessages` returns `snapshot`
pub async fn mock_feed_server(snapshot: Vec<Message>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getMessages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(GetMessagesResponse { messages: snapshot }))
        .mount(&server)
        .await;
    server
}

/// Make `POST /addMessage` fail with `status` and a feed error body
pub async fn fail_add_message(server: &MockServer, status: u16, kind: &str) {
    Mock::given(method("POST"))
        .and(path("/addMessage"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "body": "mocked failure",
            "error": kind,
            "status": status,
        })))
        .mount(server)
        .await;
}

/// Make `POST /addMessage` answer only after `delay`
pub async fn delay_add_message(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/addMessage"))
        .respond_with(ResponseTemplate::new(200).set_delay(delay))
        .mount(server)
        .await;
}

/// Number of requests the mock received on `target`
pub async fn request_count(server: &MockServer, target: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == target)
        .count()
}
