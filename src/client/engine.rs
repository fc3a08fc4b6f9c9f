//! # Client Sync Engine
//!
//! Keeps one viewer's local feed cache in step with the server.
//!
//! ## States
//!
//! ```text
//! Uninitialized --initialize--> Synced --submit--> Submitting --ok--> Synced
//!                                                      |
//!                                                      +--err--> RolledBack --> Synced
//! any --teardown--> TornDown
//! ```
//!
//! `RolledBack` is recorded in the transition log and immediately left again.
//!
//! ## Serialization
//!
//! The cache, the phase and both logs sit behind one `tokio::sync::Mutex`.
//! Every mutation is applied entirely under that lock, so a viewer sees a
//! single ordered stream of changes. The lock is *not* held while waiting for
//! the server to accept a submission; fan-out deliveries merge in meanwhile.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use feedsync::client::ClientSyncEngine;
//! # use feedsync::client::remote::{FeedGateway, FeedSource};
//! # use feedsync::shared::IdentityProvider;
//! # use std::sync::Arc;
//!
//! # async fn example(
//! #     source: Arc<dyn FeedSource>,
//! #     gateway: Arc<dyn FeedGateway>,
//! #     identity: Arc<dyn IdentityProvider>,
//! # ) {
//! let engine = ClientSyncEngine::new(source, gateway, identity);
//! engine.initialize().await.unwrap();
//! let confirmed = engine.submit("Hello!").await.unwrap();
//! assert_eq!(engine.messages().await[0].id, confirmed.id);
//! # }
//! ```

use crate::client::cache::{CacheMutation, CachedMessage, FeedCache};
use crate::client::error::SyncError;
use crate::client::remote::{FeedGateway, FeedSource};
use crate::shared::config::DEFAULT_ACCEPT_TIMEOUT;
use crate::shared::message::validate_text;
use crate::shared::{
    Clock, FeedEvent, IdGenerator, IdentityProvider, Message, SystemClock, UuidIdGenerator,
};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

/// Lifecycle phase of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Uninitialized,
    Synced,
    Submitting,
    RolledBack,
    TornDown,
}

impl SyncPhase {
    fn describe(self) -> &'static str {
        match self {
            Self::Uninitialized => "not initialized",
            Self::Synced => "synced",
            Self::Submitting => "a submission is already in flight",
            Self::RolledBack => "rolling back",
            Self::TornDown => "torn down",
        }
    }
}

/// Default number of entries kept in each history log
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Buffer of the mutation notifier; slower listeners see `Lagged`
const MUTATION_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
struct EngineState {
    phase: SyncPhase,
    cache: FeedCache,
    mutations: VecDeque<CacheMutation>,
    transitions: VecDeque<SyncPhase>,
    history_limit: usize,
    notifier: broadcast::Sender<CacheMutation>,
}

impl EngineState {
    fn new() -> Self {
        let (notifier, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        Self {
            phase: SyncPhase::Uninitialized,
            cache: FeedCache::new(),
            mutations: VecDeque::new(),
            transitions: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            notifier,
        }
    }

    fn enter(&mut self, phase: SyncPhase) {
        tracing::debug!("[Sync] {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        push_bounded(&mut self.transitions, phase, self.history_limit);
    }

    fn record(&mut self, mutation: CacheMutation) {
        // no listeners is fine
        let _ = self.notifier.send(mutation.clone());
        push_bounded(&mut self.mutations, mutation, self.history_limit);
    }
}

fn push_bounded<T>(log: &mut VecDeque<T>, item: T, limit: usize) {
    while log.len() >= limit.max(1) {
        log.pop_front();
    }
    log.push_back(item);
}

/// One viewer's optimistic, self-healing copy of the feed
pub struct ClientSyncEngine {
    source: Arc<dyn FeedSource>,
    gateway: Arc<dyn FeedGateway>,
    identity: Arc<dyn IdentityProvider>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    accept_timeout: Duration,
    state: Mutex<EngineState>,
}

impl ClientSyncEngine {
    pub fn new(
        source: Arc<dyn FeedSource>,
        gateway: Arc<dyn FeedGateway>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            source,
            gateway,
            identity,
            ids: Arc::new(UuidIdGenerator),
            clock: Arc::new(SystemClock),
            accept_timeout: DEFAULT_ACCEPT_TIMEOUT,
            state: Mutex::new(EngineState::new()),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// How many mutations and transitions are remembered; older ones are dropped
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.state.get_mut().history_limit = limit.max(1);
        self
    }

    /// Upper bound on each server round trip
    pub fn with_accept_timeout(mut self, timeout: Duration) -> Self {
        self.accept_timeout = timeout;
        self
    }

    pub fn accept_timeout(&self) -> Duration {
        self.accept_timeout
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, SyncError>>,
    ) -> Result<T, SyncError> {
        match tokio::time::timeout(self.accept_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(self.accept_timeout)),
        }
    }

    /// Seed the cache from a snapshot and become `Synced`
    ///
    /// Deliveries that arrive while the snapshot is loading wait for it and
    /// are merged afterwards.
    pub async fn initialize(&self) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;
        if state.phase != SyncPhase::Uninitialized {
            return Err(SyncError::NotReady(state.phase.describe()));
        }

        let snapshot = self.bounded(self.source.snapshot()).await?;
        state.cache = FeedCache::seeded(snapshot);
        let count = state.cache.len();
        state.record(CacheMutation::Seeded { count });
        state.enter(SyncPhase::Synced);

        tracing::info!("[Sync] Seeded cache with {} messages", count);
        Ok(())
    }

    /// Submit `text` as a new message
    ///
    /// The message appears in the cache immediately as a provisional entry.
    /// On success it is replaced by the confirmed message; on any failure it
    /// is removed again before the error is returned.
    pub async fn submit(&self, text: &str) -> Result<Message, SyncError> {
        let provisional = {
            let mut state = self.state.lock().await;
            if state.phase != SyncPhase::Synced {
                return Err(SyncError::NotReady(state.phase.describe()));
            }
            if text.trim().is_empty() {
                return Err(SyncError::EmptyText);
            }
            validate_text(text)?;
            let author = self.identity.current().ok_or(SyncError::NoIdentity)?;

            let provisional = Message::new(self.ids.next_id(), text, self.clock.now_millis(), author);
            state.cache.insert(provisional.clone(), true);
            state.record(CacheMutation::Inserted {
                id: provisional.id.clone(),
                provisional: true,
            });
            state.enter(SyncPhase::Submitting);
            provisional
        };

        tracing::debug!("[Sync] Submitting message {}", provisional.id);
        let outcome = self.bounded(self.gateway.accept(&provisional)).await;

        let mut state = self.state.lock().await;
        if state.phase == SyncPhase::TornDown {
            tracing::debug!(
                "[Sync] Discarding result for message {} after teardown",
                provisional.id
            );
            return outcome;
        }

        match outcome {
            Ok(confirmed) => {
                let moved = state.cache.confirm(&provisional.id, confirmed.clone());
                state.record(CacheMutation::Confirmed {
                    id: confirmed.id.clone(),
                    moved,
                });
                state.enter(SyncPhase::Synced);
                tracing::info!(
                    "[Sync] Message {} confirmed at {}",
                    confirmed.id,
                    confirmed.created_at
                );
                Ok(confirmed)
            }
            Err(e) => {
                state.cache.remove(&provisional.id);
                state.record(CacheMutation::RolledBack {
                    id: provisional.id.clone(),
                });
                state.enter(SyncPhase::RolledBack);
                state.enter(SyncPhase::Synced);
                tracing::warn!("[Sync] Message {} rolled back: {}", provisional.id, e);
                Err(e)
            }
        }
    }

    /// Merge a fan-out delivery
    ///
    /// Returns `true` if the message was new. Known ids, including this
    /// viewer's own provisional entries, are left untouched.
    pub async fn on_event(&self, event: FeedEvent) -> bool {
        let message = event.into_message();
        let mut state = self.state.lock().await;
        if state.phase == SyncPhase::TornDown {
            return false;
        }

        if state.cache.contains(&message.id) {
            state.record(CacheMutation::IgnoredDuplicate { id: message.id });
            return false;
        }

        let id = message.id.clone();
        state.cache.insert(message, false);
        state.record(CacheMutation::Inserted {
            id,
            provisional: false,
        });
        true
    }

    /// Replace the cache with a fresh snapshot
    ///
    /// Provisional entries the snapshot does not contain are kept, so an
    /// in-flight submission still has its entry to confirm or roll back.
    pub async fn resync(&self) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;
        if matches!(state.phase, SyncPhase::Uninitialized | SyncPhase::TornDown) {
            return Err(SyncError::NotReady(state.phase.describe()));
        }

        let snapshot = self.bounded(self.source.snapshot()).await?;
        let kept_provisional = state.cache.resync(snapshot);
        let count = state.cache.len();
        state.record(CacheMutation::Resynced {
            count,
            kept_provisional,
        });

        tracing::info!(
            "[Sync] Resynced {} messages ({} still pending)",
            count,
            kept_provisional
        );
        Ok(())
    }

    /// Discard the cache; the engine accepts nothing afterwards
    ///
    /// Callers holding a subscription release it before calling this.
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        if state.phase == SyncPhase::TornDown {
            return;
        }
        state.cache.clear();
        state.enter(SyncPhase::TornDown);
        tracing::debug!("[Sync] Engine torn down");
    }

    pub async fn phase(&self) -> SyncPhase {
        self.state.lock().await.phase
    }

    /// Messages in feed order, provisional ones included
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.cache.messages()
    }

    pub async fn entries(&self) -> Vec<CachedMessage> {
        self.state.lock().await.cache.entries().to_vec()
    }

    /// A cached message by id
    pub async fn message(&self, id: &str) -> Option<Message> {
        self.state.lock().await.cache.get(id).map(|entry| entry.message.clone())
    }

    /// The most recent mutations, oldest first
    pub async fn mutations(&self) -> Vec<CacheMutation> {
        self.state.lock().await.mutations.iter().cloned().collect()
    }

    /// The most recent phases entered, oldest first
    pub async fn transitions(&self) -> Vec<SyncPhase> {
        self.state.lock().await.transitions.iter().cloned().collect()
    }

    /// Every mutation applied from now on, as it happens
    pub async fn watch_mutations(&self) -> broadcast::Receiver<CacheMutation> {
        self.state.lock().await.notifier.subscribe()
    }
}

impl std::fmt::Debug for ClientSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSyncEngine")
            .field("accept_timeout", &self.accept_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{Author, ManualClock, StaticIdentity};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    fn alice() -> Author {
        Author::new("Alice", "", "alice@example.com")
    }

    fn message(id: &str, created_at: i64) -> Message {
        Message::new(id, format!("text {}", id), created_at, alice())
    }

    struct Sequence(AtomicUsize);

    impl IdGenerator for Sequence {
        fn next_id(&self) -> String {
            format!("local-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    /// Snapshot source plus a server that stamps with its own clock
    struct FakeServer {
        snapshot: StdMutex<Vec<Message>>,
        server_time: i64,
        fail_with: Option<SyncError>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl FakeServer {
        fn new(snapshot: Vec<Message>, server_time: i64) -> Self {
            Self {
                snapshot: StdMutex::new(snapshot),
                server_time,
                fail_with: None,
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn failing(snapshot: Vec<Message>, error: SyncError) -> Self {
            Self {
                fail_with: Some(error),
                ..Self::new(snapshot, 0)
            }
        }

        fn gated(snapshot: Vec<Message>, server_time: i64, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(snapshot, server_time)
            }
        }
    }

    #[async_trait]
    impl FeedSource for FakeServer {
        async fn snapshot(&self) -> Result<Vec<Message>, SyncError> {
            let mut messages = self.snapshot.lock().unwrap().clone();
            crate::shared::sort_feed(&mut messages);
            Ok(messages)
        }
    }

    #[async_trait]
    impl FeedGateway for FakeServer {
        async fn accept(&self, provisional: &Message) -> Result<Message, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }
            let mut confirmed = provisional.clone();
            confirmed.created_at = self.server_time;
            self.snapshot.lock().unwrap().push(confirmed.clone());
            Ok(confirmed)
        }
    }

    fn engine(server: Arc<FakeServer>, identity: StaticIdentity) -> ClientSyncEngine {
        ClientSyncEngine::new(server.clone(), server, Arc::new(identity))
            .with_id_generator(Arc::new(Sequence(AtomicUsize::new(0))))
            .with_clock(Arc::new(ManualClock::fixed(1000)))
    }

    async fn synced(server: Arc<FakeServer>) -> ClientSyncEngine {
        let engine = engine(server, StaticIdentity::signed_in(alice()));
        engine.initialize().await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_initialize_seeds_ordered_cache() {
        let server = Arc::new(FakeServer::new(vec![message("a", 100), message("b", 300), message("c", 200)], 0));
        let engine = synced(server).await;

        let ids: Vec<_> = engine.messages().await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(engine.phase().await, SyncPhase::Synced);
        assert_eq!(engine.mutations().await, vec![CacheMutation::Seeded { count: 3 }]);
    }

    #[tokio::test]
    async fn test_initialize_twice_is_not_ready() {
        let engine = synced(Arc::new(FakeServer::new(vec![], 0))).await;
        assert_matches!(engine.initialize().await, Err(SyncError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_submit_before_initialize_is_not_ready() {
        let server = Arc::new(FakeServer::new(vec![], 5000));
        let engine = engine(server.clone(), StaticIdentity::signed_in(alice()));
        assert_matches!(engine.submit("hi").await, Err(SyncError::NotReady(_)));
        assert_eq!(server.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_uses_server_timestamp() {
        let server = Arc::new(FakeServer::new(vec![message("old", 2000)], 5000));
        let engine = synced(server).await;

        let confirmed = engine.submit("hi").await.unwrap();

        assert_eq!(confirmed.created_at, 5000);
        let entries = engine.entries().await;
        assert_eq!(entries[0].message, confirmed);
        assert!(!entries[0].provisional);
        assert_eq!(
            engine.mutations().await[1..].to_vec(),
            vec![
                CacheMutation::Inserted { id: "local-0".into(), provisional: true },
                CacheMutation::Confirmed { id: "local-0".into(), moved: true },
            ]
        );
        assert_eq!(
            engine.transitions().await,
            vec![SyncPhase::Synced, SyncPhase::Submitting, SyncPhase::Synced]
        );
    }

    #[tokio::test]
    async fn test_blank_text_never_leaves_client() {
        let server = Arc::new(FakeServer::new(vec![], 5000));
        let engine = synced(server.clone()).await;

        assert_matches!(engine.submit("   ").await, Err(SyncError::EmptyText));
        assert_eq!(server.calls.load(Ordering::SeqCst), 0);
        assert!(engine.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_identity_never_leaves_client() {
        let server = Arc::new(FakeServer::new(vec![], 5000));
        let engine = engine(server.clone(), StaticIdentity::anonymous());
        engine.initialize().await.unwrap();

        assert_matches!(engine.submit("hi").await, Err(SyncError::NoIdentity));
        assert_eq!(server.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_submit_rolls_back() {
        let server = Arc::new(FakeServer::failing(
            vec![message("a", 100), message("b", 200)],
            SyncError::StoreUnavailable("down".into()),
        ));
        let engine = synced(server).await;
        let before = engine.entries().await;

        let result = engine.submit("hi").await;

        assert_matches!(result, Err(SyncError::StoreUnavailable(_)));
        assert_eq!(engine.entries().await, before);
        assert_eq!(engine.phase().await, SyncPhase::Synced);
        assert_eq!(
            engine.transitions().await,
            vec![
                SyncPhase::Synced,
                SyncPhase::Submitting,
                SyncPhase::RolledBack,
                SyncPhase::Synced
            ]
        );
        assert_eq!(
            engine.mutations().await.last(),
            Some(&CacheMutation::RolledBack { id: "local-0".into() })
        );
    }

    #[tokio::test]
    async fn test_timeout_rolls_back() {
        let gate = Arc::new(Notify::new());
        let server = Arc::new(FakeServer::gated(vec![], 5000, gate));
        let engine = synced(server)
            .await
            .with_accept_timeout(Duration::from_millis(50));

        let result = engine.submit("hi").await;

        assert_matches!(result, Err(SyncError::Timeout(_)));
        assert!(engine.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_provisional_visible_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let server = Arc::new(FakeServer::gated(vec![], 5000, gate.clone()));
        let engine = Arc::new(synced(server).await);

        let submitter = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.submit("hi").await })
        };
        while engine.phase().await != SyncPhase::Submitting {
            tokio::task::yield_now().await;
        }

        let entries = engine.entries().await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].provisional);
        assert_eq!(entries[0].message.created_at, 1000);
        assert_matches!(engine.submit("again").await, Err(SyncError::NotReady(_)));

        gate.notify_one();
        let confirmed = submitter.await.unwrap().unwrap();
        assert_eq!(engine.messages().await, vec![confirmed]);
    }

    #[tokio::test]
    async fn test_events_merge_during_submission_and_survive_rollback() {
        let gate = Arc::new(Notify::new());
        let server = Arc::new(FakeServer {
            fail_with: Some(SyncError::Transport("reset".into())),
            ..FakeServer::gated(vec![], 0, gate.clone())
        });
        let engine = Arc::new(synced(server).await);

        let submitter = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.submit("hi").await })
        };
        while engine.phase().await != SyncPhase::Submitting {
            tokio::task::yield_now().await;
        }

        assert!(engine.on_event(FeedEvent::NewMessage(message("other", 1500))).await);
        gate.notify_one();
        assert!(submitter.await.unwrap().is_err());

        let ids: Vec<_> = engine.messages().await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["other"]);
    }

    #[tokio::test]
    async fn test_on_event_dedups_by_id() {
        let engine = synced(Arc::new(FakeServer::new(vec![message("a", 100)], 0))).await;
        let before = engine.entries().await;

        assert!(!engine.on_event(FeedEvent::NewMessage(message("a", 100))).await);
        assert_eq!(engine.entries().await, before);
        assert_eq!(
            engine.mutations().await.last(),
            Some(&CacheMutation::IgnoredDuplicate { id: "a".into() })
        );
    }

    #[tokio::test]
    async fn test_on_event_inserts_in_order() {
        let engine = synced(Arc::new(FakeServer::new(vec![message("a", 100), message("c", 300)], 0))).await;

        assert!(engine.on_event(FeedEvent::NewMessage(message("b", 200))).await);

        let ids: Vec<_> = engine.messages().await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_own_echo_is_ignored() {
        let server = Arc::new(FakeServer::new(vec![], 5000));
        let engine = synced(server).await;

        let confirmed = engine.submit("hi").await.unwrap();
        assert!(!engine.on_event(FeedEvent::NewMessage(confirmed.clone())).await);
        assert_eq!(engine.messages().await, vec![confirmed]);
    }

    #[tokio::test]
    async fn test_resync_picks_up_missed_messages() {
        let server = Arc::new(FakeServer::new(vec![message("a", 100)], 0));
        let engine = synced(server.clone()).await;
        server.snapshot.lock().unwrap().push(message("missed", 200));

        engine.resync().await.unwrap();

        let ids: Vec<_> = engine.messages().await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["missed", "a"]);
        assert_eq!(
            engine.mutations().await.last(),
            Some(&CacheMutation::Resynced { count: 2, kept_provisional: 0 })
        );
    }

    #[tokio::test]
    async fn test_teardown_discards_and_blocks() {
        let engine = synced(Arc::new(FakeServer::new(vec![message("a", 100)], 0))).await;

        engine.teardown().await;
        engine.teardown().await;

        assert_eq!(engine.phase().await, SyncPhase::TornDown);
        assert!(engine.messages().await.is_empty());
        assert!(!engine.on_event(FeedEvent::NewMessage(message("b", 200))).await);
        assert_matches!(engine.submit("hi").await, Err(SyncError::NotReady(_)));
        assert_matches!(engine.resync().await, Err(SyncError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_submit_finishing_after_teardown_is_discarded() {
        let gate = Arc::new(Notify::new());
        let server = Arc::new(FakeServer::gated(vec![], 5000, gate.clone()));
        let engine = Arc::new(synced(server).await);

        let submitter = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.submit("hi").await })
        };
        while engine.phase().await != SyncPhase::Submitting {
            tokio::task::yield_now().await;
        }

        engine.teardown().await;
        gate.notify_one();

        assert!(submitter.await.unwrap().is_ok());
        assert!(engine.messages().await.is_empty());
        assert_eq!(engine.phase().await, SyncPhase::TornDown);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let server = Arc::new(FakeServer::new(vec![message("a", 100)], 0));
        let engine = engine(server, StaticIdentity::signed_in(alice())).with_history_limit(8);
        engine.initialize().await.unwrap();

        for _ in 0..10_000 {
            engine.on_event(FeedEvent::NewMessage(message("a", 100))).await;
        }

        assert_eq!(engine.messages().await.len(), 1);
        let mutations = engine.mutations().await;
        assert_eq!(mutations.len(), 8);
        assert!(mutations
            .iter()
            .all(|m| *m == CacheMutation::IgnoredDuplicate { id: "a".to_string() }));
        assert!(engine.transitions().await.len() <= 8);
    }

    #[tokio::test]
    async fn test_default_history_limit_applies() {
        let engine = synced(Arc::new(FakeServer::new(vec![], 0))).await;
        for i in 0..(DEFAULT_HISTORY_LIMIT * 2) {
            engine.on_event(FeedEvent::NewMessage(message(&format!("m-{}", i), i as i64))).await;
        }
        assert_eq!(engine.mutations().await.len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(engine.messages().await.len(), DEFAULT_HISTORY_LIMIT * 2);
    }

    #[tokio::test]
    async fn test_watchers_are_told_about_deliveries() {
        let engine = synced(Arc::new(FakeServer::new(vec![], 0))).await;
        let mut watcher = engine.watch_mutations().await;

        engine.on_event(FeedEvent::NewMessage(message("b", 200))).await;
        engine.on_event(FeedEvent::NewMessage(message("b", 200))).await;

        assert_eq!(
            watcher.recv().await.unwrap(),
            CacheMutation::Inserted { id: "b".to_string(), provisional: false }
        );
        assert_eq!(
            watcher.recv().await.unwrap(),
            CacheMutation::IgnoredDuplicate { id: "b".to_string() }
        );
        assert_eq!(engine.message("b").await, Some(message("b", 200)));
    }
}
