/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Routes
 *
 * - `/addMessage` - any method; only POST is accepted, the rest get 405
 * - `/getMessages` - any method; only GET is accepted, the rest get 405
 * - `/subscribe` - GET, Server-Sent Events feed
 * - `/health` - GET, liveness probe
 * - anything else - 404
 */
use crate::backend::chat::handlers::{handle_add_message, handle_get_messages};
use crate::backend::realtime::handle_feed_subscription;
use crate::backend::server::state::AppState;
use axum::{
    http::StatusCode,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/addMessage", any(handle_add_message))
        .route("/getMessages", any(handle_get_messages))
        .route("/subscribe", get(handle_feed_subscription))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "body": "Not Found", "error": "not_found", "status": 404 })),
    )
}
