/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including service creation, store loading, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Load the message store (SQLite when configured, memory otherwise)
 * 2. Create the fan-out bus
 * 3. Build the gateway and query service over the shared store
 * 4. Create and configure the router
 * 5. Start the periodic cleanup of idle fan-out topics
 *
 * Tests skip steps 1 and 5 and call [`build_state`] with their own store and
 * clock, then [`create_app_with_state`].
 */
use crate::backend::chat::{PublishGateway, QueryService};
use crate::backend::realtime::FanoutBus;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;
use crate::backend::store::{SharedStore, StoreError};
use crate::shared::{Clock, SystemClock};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;

/// How often idle fan-out topics are dropped
const TOPIC_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Wire the services together around `store`
pub fn build_state(store: SharedStore, clock: Arc<dyn Clock>, fanout_capacity: usize) -> AppState {
    let bus = FanoutBus::new(fanout_capacity);
    let gateway = PublishGateway::new(store.clone(), Arc::new(bus.clone()), clock);
    let query = QueryService::new(store.clone());

    AppState {
        gateway: Arc::new(gateway),
        query,
        bus,
        store,
    }
}

/// Create the full application from configuration
pub async fn create_app(config: &ServerConfig) -> Result<Router<()>, StoreError> {
    tracing::info!("Initializing feedsync backend server");

    let store = config.load_store().await?;
    let app_state = build_state(store, Arc::new(SystemClock), config.fanout_capacity);

    let cleanup_bus = app_state.bus.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOPIC_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let pruned = cleanup_bus.prune_idle_topics();
            tracing::debug!("[Fanout] Cleaned up {} idle topics", pruned);
        }
    });

    tracing::info!("Router configured with periodic cleanup task");
    Ok(create_app_with_state(app_state))
}

/// Create the router over an already built state
pub fn create_app_with_state(app_state: AppState) -> Router<()> {
    create_router(app_state)
}
