/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds the explicit service objects built once at startup:
 * - `PublishGateway` - the write path
 * - `QueryService` - the read path
 * - `FanoutBus` - live subscriptions
 * - the shared message store behind both paths
 *
 * Every field is cheap to clone (`Arc` or internally shared), so cloning the
 * state per request costs a handful of reference-count bumps.
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract specific
 * parts of the state without needing the entire `AppState`.
 *
 * # Example
 *
 * ```rust,no_run
 * use feedsync::backend::chat::QueryService;
 * use axum::extract::State;
 *
 * async fn handler(State(query): State<QueryService>) {
 *     let feed = query.snapshot().await;
 *     // ...
 * }
 * ```
 */
use crate::backend::chat::{PublishGateway, QueryService};
use crate::backend::realtime::FanoutBus;
use crate::backend::store::SharedStore;
use axum::extract::FromRef;
use std::sync::Arc;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Validates, timestamps, persists and announces submissions
    pub gateway: Arc<PublishGateway>,

    /// Ordered snapshots of the feed
    pub query: QueryService,

    /// Fan-out bus for SSE subscribers
    pub bus: FanoutBus,

    /// Store behind the gateway and the query service
    pub store: SharedStore,
}

/// Implement FromRef for the publish gateway
///
/// Used by `POST /addMessage`.
impl FromRef<AppState> for Arc<PublishGateway> {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

/// Implement FromRef for the query service
///
/// Used by `GET /getMessages`.
impl FromRef<AppState> for QueryService {
    fn from_ref(state: &AppState) -> Self {
        state.query.clone()
    }
}

/// Implement FromRef for the fan-out bus
///
/// Used by `GET /subscribe`.
impl FromRef<AppState> for FanoutBus {
    fn from_ref(state: &AppState) -> Self {
        state.bus.clone()
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend_name())
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}
