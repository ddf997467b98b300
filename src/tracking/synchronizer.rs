use super::cache::{CachedSnapshot, SnapshotCache};
use super::signals::{EtaBucket, Signals, StopsAway};
use super::source::{FetchError, OrderSource};
use crate::lifecycle::config::TrackingConfig;
use crate::model::{Order, OrderId, OrderStatus};
use crate::order_actor::StatusChanged;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn, Instrument};

/// What a customer-facing tracking view displays.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingState {
    /// Nothing fetched and nothing cached yet.
    Loading,
    /// The latest successful fetch.
    Live { order: Order, signals: Signals },
    /// The last good snapshot, shown because the store could not be reached.
    Cached {
        order: Order,
        signals: Signals,
        fetched_at: DateTime<Utc>,
        error: Option<FetchError>,
    },
    /// Fetch failed and there is no snapshot to fall back to.
    Unavailable { error: FetchError },
    /// The store does not know this order and there is no snapshot.
    Missing,
}

impl TrackingState {
    pub fn order(&self) -> Option<&Order> {
        match self {
            TrackingState::Live { order, .. } | TrackingState::Cached { order, .. } => Some(order),
            _ => None,
        }
    }

    /// The status on display, if any.
    pub fn status(&self) -> Option<OrderStatus> {
        self.order().map(|order| order.status)
    }

    pub fn signals(&self) -> Option<Signals> {
        match self {
            TrackingState::Live { signals, .. } | TrackingState::Cached { signals, .. } => {
                Some(*signals)
            }
            _ => None,
        }
    }
}

/// Keeps one order's tracking view in step with the store.
///
/// Drive it by hand with [`mount`](Self::mount) and [`poll_once`](Self::poll_once),
/// or hand it to [`spawn`](Self::spawn) for a polling loop on the configured interval.
pub struct TrackingSynchronizer {
    id: OrderId,
    source: Arc<dyn OrderSource>,
    cache: Arc<dyn SnapshotCache>,
    poll_interval: Duration,
    fetch_timeout: Duration,
    last_status: Option<OrderStatus>,
    last_good: Option<CachedSnapshot>,
    stops: StopsAway,
    finished: bool,
    state: watch::Sender<TrackingState>,
    changes: broadcast::Sender<StatusChanged>,
}

impl TrackingSynchronizer {
    pub fn new(
        id: OrderId,
        source: Arc<dyn OrderSource>,
        cache: Arc<dyn SnapshotCache>,
        config: &TrackingConfig,
    ) -> Self {
        let (state, _) = watch::channel(TrackingState::Loading);
        let (changes, _) = broadcast::channel(16);
        Self {
            id,
            source,
            cache,
            poll_interval: config.poll_interval(),
            fetch_timeout: config.fetch_timeout(),
            last_status: None,
            last_good: None,
            stops: StopsAway::new(config.initial_stops),
            finished: false,
            state,
            changes,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    /// The state currently on display.
    pub fn state(&self) -> TrackingState {
        self.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<TrackingState> {
        self.state.subscribe()
    }

    /// Status-change notifications, one per observed transition.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StatusChanged> {
        self.changes.subscribe()
    }

    /// True once polling has stopped for good (the order does not exist).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Shows the persisted snapshot, if any, before the first fetch completes.
    pub async fn mount(&mut self) {
        match self.cache.load(self.id).await {
            Ok(Some(snapshot)) => {
                debug!(id = %self.id, status = %snapshot.order.status, "Showing cached snapshot");
                self.last_status = Some(snapshot.order.status);
                let signals = self.cached_signals(snapshot.order.status);
                self.state.send_replace(TrackingState::Cached {
                    order: snapshot.order.clone(),
                    signals,
                    fetched_at: snapshot.fetched_at,
                    error: None,
                });
                self.last_good = Some(snapshot);
            }
            Ok(None) => {}
            Err(e) => warn!(id = %self.id, error = %e, "Snapshot cache unreadable"),
        }
    }

    /// Fetches once and updates the view. A failed fetch falls back to the last
    /// good snapshot and never emits a notification.
    pub async fn poll_once(&mut self) -> TrackingState {
        if self.finished {
            return self.state();
        }

        let fetch = self.source.fetch(self.id);
        let fetched = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        };

        let next = match fetched {
            Ok(order) => self.on_fetched(order).await,
            Err(error) => self.on_failed(error),
        };
        self.state.send_replace(next.clone());
        next
    }

    async fn on_fetched(&mut self, order: Order) -> TrackingState {
        if let Some(from) = self.last_status.filter(|from| *from != order.status) {
            info!(id = %self.id, %from, to = %order.status, "Tracked status changed");
            let _ = self.changes.send(StatusChanged {
                id: order.id,
                from,
                to: order.status,
                at: order.status_updated_at,
            });
        }
        self.last_status = Some(order.status);

        let snapshot = CachedSnapshot::now(order.clone());
        if let Err(e) = self.cache.store(&snapshot).await {
            warn!(id = %self.id, error = %e, "Could not persist snapshot");
        }
        self.last_good = Some(snapshot);

        let signals = Signals {
            eta: EtaBucket::for_status(order.status),
            stops_away: self.stops.observe(order.status),
        };
        TrackingState::Live { order, signals }
    }

    fn on_failed(&mut self, error: FetchError) -> TrackingState {
        if matches!(error, FetchError::NotFound(_)) {
            warn!(id = %self.id, "Order not found, polling stops");
            self.finished = true;
        } else {
            warn!(id = %self.id, error = %error, "Poll failed");
        }

        match &self.last_good {
            Some(snapshot) => TrackingState::Cached {
                order: snapshot.order.clone(),
                signals: self.cached_signals(snapshot.order.status),
                fetched_at: snapshot.fetched_at,
                error: Some(error),
            },
            None if self.finished => TrackingState::Missing,
            None => TrackingState::Unavailable { error },
        }
    }

    fn cached_signals(&self, status: OrderStatus) -> Signals {
        Signals {
            eta: EtaBucket::for_status(status),
            stops_away: self.stops.current(status),
        }
    }

    /// Mounts and polls on the configured interval until the handle is stopped
    /// or dropped, or the order turns out not to exist.
    pub fn spawn(mut self) -> TrackingHandle {
        let state = self.watch_state();
        let changes = self.changes.clone();
        let (shutdown_tx, mut shutdown) = oneshot::channel::<()>();
        let span = tracing::info_span!("tracking", id = %self.id);

        let task = tokio::spawn(
            async move {
                info!("Tracking started");
                self.mount().await;

                let mut interval = tokio::time::interval(self.poll_interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = interval.tick() => {}
                    }
                    // A poll in flight runs to completion so its cache write is never cut short.
                    self.poll_once().await;
                    if self.finished {
                        break;
                    }
                }
                info!("Tracking stopped");
            }
            .instrument(span),
        );

        TrackingHandle {
            state,
            changes,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running tracking loop. Dropping it stops the loop.
pub struct TrackingHandle {
    state: watch::Receiver<TrackingState>,
    changes: broadcast::Sender<StatusChanged>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TrackingHandle {
    pub fn state(&self) -> TrackingState {
        self.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<TrackingState> {
        self.state.clone()
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<StatusChanged> {
        self.changes.subscribe()
    }

    /// Whether the loop has exited on its own.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops polling and waits for the loop to exit, letting a poll in flight
    /// finish first. Nothing is published afterwards.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Tracking task ended abnormally");
            }
        }
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ShippingInfo, Totals};
    use crate::tracking::cache::MemoryCache;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed script of fetch results, then repeats the last one.
    struct Scripted {
        script: Mutex<VecDeque<Result<Order, FetchError>>>,
        delay: Duration,
    }

    impl Scripted {
        fn new(script: Vec<Result<Order, FetchError>>) -> Arc<Self> {
            Self::slow(script, Duration::ZERO)
        }

        fn slow(script: Vec<Result<Order, FetchError>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                delay,
            })
        }

        fn hanging() -> Arc<Self> {
            Self::slow(Vec::new(), Duration::from_secs(3600))
        }
    }

    #[async_trait]
    impl OrderSource for Scripted {
        async fn fetch(&self, _id: OrderId) -> Result<Order, FetchError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        }
    }

    fn order(id: OrderId, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id,
            line_items: vec![],
            shipping: ShippingInfo::default(),
            pricing: Totals::default(),
            status,
            created_at: now,
            status_updated_at: now,
        }
    }

    fn config() -> TrackingConfig {
        TrackingConfig {
            poll_interval_ms: 1000,
            fetch_timeout_ms: 200,
            initial_stops: 5,
            cache_dir: None,
        }
    }

    fn network() -> FetchError {
        FetchError::Network("connection reset".to_string())
    }

    #[tokio::test]
    async fn test_status_change_notifies_exactly_once() {
        let id = OrderId::new();
        let source = Scripted::new(vec![
            Ok(order(id, OrderStatus::Shipped)),
            Ok(order(id, OrderStatus::OutForDelivery)),
            Ok(order(id, OrderStatus::OutForDelivery)),
        ]);
        let cache = Arc::new(MemoryCache::new());
        let mut sync = TrackingSynchronizer::new(id, source, cache, &config());
        let mut changes = sync.subscribe_changes();

        sync.mount().await;
        assert_eq!(sync.state(), TrackingState::Loading);

        // First observation establishes the baseline without notifying.
        assert_eq!(sync.poll_once().await.status(), Some(OrderStatus::Shipped));
        assert!(changes.try_recv().is_err());

        let state = sync.poll_once().await;
        assert_eq!(state.status(), Some(OrderStatus::OutForDelivery));
        let event = changes.try_recv().unwrap();
        assert_eq!((event.from, event.to), (OrderStatus::Shipped, OrderStatus::OutForDelivery));

        sync.poll_once().await;
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_last_good_snapshot() {
        let id = OrderId::new();
        let source = Scripted::new(vec![
            Ok(order(id, OrderStatus::Shipped)),
            Err(network()),
            Err(network()),
            Ok(order(id, OrderStatus::OutForDelivery)),
        ]);
        let cache = Arc::new(MemoryCache::new());
        let mut sync = TrackingSynchronizer::new(id, source, cache, &config());
        let mut changes = sync.subscribe_changes();

        sync.poll_once().await;
        for _ in 0..2 {
            match sync.poll_once().await {
                TrackingState::Cached { order, error, .. } => {
                    assert_eq!(order.status, OrderStatus::Shipped);
                    assert_eq!(error, Some(network()));
                }
                other => panic!("expected cached state, got {other:?}"),
            }
        }
        assert!(changes.try_recv().is_err());

        assert!(matches!(sync.poll_once().await, TrackingState::Live { .. }));
        let event = changes.try_recv().unwrap();
        assert_eq!(event.to, OrderStatus::OutForDelivery);
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failure_without_snapshot_is_unavailable() {
        let id = OrderId::new();
        let mut sync = TrackingSynchronizer::new(
            id,
            Scripted::new(vec![Err(network())]),
            Arc::new(MemoryCache::new()),
            &config(),
        );
        sync.mount().await;
        assert_eq!(
            sync.poll_once().await,
            TrackingState::Unavailable { error: network() }
        );
        assert!(!sync.is_finished());
    }

    #[tokio::test]
    async fn test_mount_shows_persisted_snapshot() {
        let id = OrderId::new();
        let cache = Arc::new(MemoryCache::new());
        cache
            .store(&CachedSnapshot::now(order(id, OrderStatus::Packed)))
            .await
            .unwrap();

        let mut sync = TrackingSynchronizer::new(
            id,
            Scripted::new(vec![Ok(order(id, OrderStatus::Shipped))]),
            cache,
            &config(),
        );
        let mut changes = sync.subscribe_changes();
        sync.mount().await;
        assert_eq!(sync.state().status(), Some(OrderStatus::Packed));

        // The snapshot seeds the baseline, so the first fetch is already a change.
        sync.poll_once().await;
        assert_eq!(changes.try_recv().unwrap().from, OrderStatus::Packed);
    }

    #[tokio::test]
    async fn test_unknown_order_stops_polling() {
        let id = OrderId::new();
        let mut sync = TrackingSynchronizer::new(
            id,
            Scripted::new(vec![Err(FetchError::NotFound(id.to_string()))]),
            Arc::new(MemoryCache::new()),
            &config(),
        );
        assert_eq!(sync.poll_once().await, TrackingState::Missing);
        assert!(sync.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_times_out() {
        let id = OrderId::new();
        let mut sync = TrackingSynchronizer::new(
            id,
            Scripted::hanging(),
            Arc::new(MemoryCache::new()),
            &config(),
        );
        match sync.poll_once().await {
            TrackingState::Unavailable { error } => {
                assert_eq!(error, FetchError::Timeout(Duration::from_millis(200)))
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stops_away_in_live_state() {
        let id = OrderId::new();
        let source = Scripted::new(vec![
            Ok(order(id, OrderStatus::OutForDelivery)),
            Ok(order(id, OrderStatus::OutForDelivery)),
        ]);
        let cache = Arc::new(MemoryCache::new());
        let mut sync = TrackingSynchronizer::new(id, source, cache, &config());
        let first = sync.poll_once().await.signals().unwrap();
        let second = sync.poll_once().await.signals().unwrap();
        assert_eq!(first.eta, EtaBucket::ArrivingToday);
        assert_eq!(first.stops_away, Some(5));
        assert_eq!(second.stops_away, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_loop_polls_until_stopped() {
        let id = OrderId::new();
        let source = Scripted::new(vec![
            Ok(order(id, OrderStatus::Packed)),
            Ok(order(id, OrderStatus::Shipped)),
        ]);
        let handle =
            TrackingSynchronizer::new(id, source, Arc::new(MemoryCache::new()), &config()).spawn();
        let mut changes = handle.subscribe_changes();

        let event = changes.recv().await.unwrap();
        assert_eq!((event.from, event.to), (OrderStatus::Packed, OrderStatus::Shipped));
        let mut state = handle.watch_state();
        state
            .wait_for(|s| s.status() == Some(OrderStatus::Shipped))
            .await
            .unwrap();

        handle.stop().await;
        assert!(matches!(
            changes.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_in_flight_poll_finish() {
        let id = OrderId::new();
        let cache = Arc::new(MemoryCache::new());
        let source = Scripted::slow(
            vec![Ok(order(id, OrderStatus::Shipped))],
            Duration::from_millis(100),
        );
        let handle = TrackingSynchronizer::new(id, source, cache.clone(), &config()).spawn();

        // The first poll is waiting on its fetch.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.state(), TrackingState::Loading);

        handle.stop().await;
        let snapshot = cache.load(id).await.unwrap().unwrap();
        assert_eq!(snapshot.order.status, OrderStatus::Shipped);
    }
}
