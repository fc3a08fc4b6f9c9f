//! # Viewer Session
//!
//! Ties a [`ClientSyncEngine`] to a live [`FeedSubscription`]: subscribe,
//! seed, then pump every delivery into `on_event` from a spawned task until
//! teardown.
//!
//! Subscribing happens before the snapshot is read, so a message confirmed
//! while the snapshot loads is either in the snapshot or queued on the
//! subscription; duplicates are dropped by the engine.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use feedsync::client::{transport::HttpGateway, ViewerSession};
//! use feedsync::shared::{AppConfig, Author, StaticIdentity};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = AppConfig::builder().server_url("http://127.0.0.1:3000").build().unwrap();
//! let http = Arc::new(HttpGateway::new(&config).unwrap());
//! let identity = Arc::new(StaticIdentity::signed_in(Author::new("Bob", "", "bob@example.com")));
//!
//! let mut session = ViewerSession::connect_http(http, identity, &config).await.unwrap();
//! let feed = session.engine().messages().await;
//! session.teardown().await;
//! # }
//! ```

use crate::client::engine::ClientSyncEngine;
use crate::client::error::SyncError;
use crate::client::remote::FeedSubscription;
use crate::client::transport::HttpGateway;
use crate::shared::{AppConfig, IdentityProvider};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running viewer
#[derive(Debug)]
pub struct ViewerSession {
    engine: Arc<ClientSyncEngine>,
    shutdown: Option<oneshot::Sender<()>>,
    pump: Option<JoinHandle<()>>,
}

impl ViewerSession {
    /// Seed `engine` and start pumping `subscription` into it
    ///
    /// `subscription` must already be registered. It is released if seeding
    /// fails.
    pub async fn start(
        engine: Arc<ClientSyncEngine>,
        mut subscription: Box<dyn FeedSubscription>,
    ) -> Result<Self, SyncError> {
        if let Err(e) = engine.initialize().await {
            subscription.unsubscribe();
            return Err(e);
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let pump = tokio::spawn(pump_events(engine.clone(), subscription, shutdown_rx));

        Ok(Self {
            engine,
            shutdown: Some(shutdown),
            pump: Some(pump),
        })
    }

    /// Viewer over HTTP and Server-Sent Events
    pub async fn connect_http(
        http: Arc<HttpGateway>,
        identity: Arc<dyn IdentityProvider>,
        config: &AppConfig,
    ) -> Result<Self, SyncError> {
        let subscription = http.subscribe().await?;
        let engine = ClientSyncEngine::new(http.clone(), http, identity)
            .with_accept_timeout(config.accept_timeout);
        Self::start(Arc::new(engine), Box::new(subscription)).await
    }

    /// Viewer living in the same process as the backend
    #[cfg(feature = "ssr")]
    pub async fn connect_local(
        feed: crate::client::remote::LocalFeed,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, SyncError> {
        let subscription = feed
            .subscribe()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let feed = Arc::new(feed);
        let engine = ClientSyncEngine::new(feed.clone(), feed, identity);
        Self::start(Arc::new(engine), Box::new(subscription)).await
    }

    pub fn engine(&self) -> &Arc<ClientSyncEngine> {
        &self.engine
    }

    /// Whether deliveries are still being pumped
    pub fn is_live(&self) -> bool {
        self.pump.as_ref().is_some_and(|pump| !pump.is_finished())
    }

    /// Stop delivery, release the subscription, then discard the cache
    pub async fn teardown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                tracing::warn!("[Sync] Event pump ended abnormally: {}", e);
            }
        }
        self.engine.teardown().await;
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        // aborting drops the subscription, which unsubscribes
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

async fn pump_events(
    engine: Arc<ClientSyncEngine>,
    mut subscription: Box<dyn FeedSubscription>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        let delivered = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            event = subscription.next_event() => event,
        };

        match delivered {
            Some(event) => {
                engine.on_event(event).await;
            }
            None => {
                tracing::warn!("[Sync] Subscription ended; use resync to catch up");
                break;
            }
        }
    }
    subscription.unsubscribe();
}
