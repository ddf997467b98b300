use super::error::AdminError;
use crate::clients::OrderClient;
use crate::lifecycle::config::AdminConfig;
use crate::model::{OrderFilter, OrderId, OrderPage, OrderStatus, OrderSummary, PageRequest, Role};
use crate::order_actor::{transitions, Direction, TransitionOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn, Instrument};

/// One listing row.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminRow {
    pub summary: OrderSummary,
    /// Request id of an unconfirmed status change shown in this row.
    pub pending: Option<u64>,
}

/// What the admin screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminView {
    pub filter: OrderFilter,
    pub page: usize,
    pub page_size: usize,
    /// Matches across all pages.
    pub total: usize,
    pub rows: Vec<AdminRow>,
    pub last_error: Option<AdminError>,
}

impl AdminView {
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }

    pub fn row(&self, id: OrderId) -> Option<&AdminRow> {
        self.rows.iter().find(|row| row.summary.id == id)
    }
}

/// An optimistic change awaiting the store's answer.
#[derive(Debug)]
struct Pending {
    id: OrderId,
    prior: OrderStatus,
    shown: OrderStatus,
}

#[derive(Debug)]
struct Session {
    view: AdminView,
    pending: HashMap<u64, Pending>,
    next_request: u64,
    /// Bumped whenever the filter or page changes, so late listings for the old
    /// criteria are dropped.
    generation: u64,
}

impl Session {
    fn row_mut(&mut self, id: OrderId) -> Option<&mut AdminRow> {
        self.view.rows.iter_mut().find(|row| row.summary.id == id)
    }

    fn apply_page(&mut self, page: OrderPage) {
        self.view.total = page.total;
        self.view.page = page.page;
        self.view.rows = page
            .items
            .into_iter()
            .map(|summary| AdminRow {
                summary,
                pending: None,
            })
            .collect();

        // Changes still in flight keep showing until the store answers.
        let mut in_flight: Vec<_> = self
            .pending
            .iter()
            .map(|(req, p)| (*req, p.id, p.shown))
            .collect();
        in_flight.sort_by_key(|(req, ..)| *req);
        for (request, id, shown) in in_flight {
            if let Some(row) = self.row_mut(id) {
                row.summary.status = shown;
                row.pending = Some(request);
            }
        }
    }

    fn apply_optimistic(&mut self, id: OrderId, direction: Direction) -> u64 {
        self.next_request += 1;
        let request = self.next_request;
        let Some(row) = self.row_mut(id) else {
            return request;
        };
        let prior = row.summary.status;
        if let Some(shown) = transitions::step(prior, direction) {
            row.summary.status = shown;
            row.pending = Some(request);
            self.pending.insert(request, Pending { id, prior, shown });
        }
        request
    }

    fn commit(&mut self, request: u64, outcome: &TransitionOutcome) {
        self.pending.remove(&request);
        if let Some(row) = self.row_mut(outcome.order.id) {
            // A newer change on the same row owns it until that one resolves.
            if row.pending.is_none() || row.pending == Some(request) {
                row.summary = outcome.order.summary();
                row.pending = None;
            }
        }
    }

    fn rollback(&mut self, request: u64) {
        let Some(pending) = self.pending.remove(&request) else {
            return;
        };
        // The next change on this order was shown on top of this one.
        let stacked = self
            .pending
            .iter_mut()
            .filter(|(req, p)| **req > request && p.id == pending.id)
            .min_by_key(|(req, _)| **req);
        if let Some((_, next)) = stacked {
            next.prior = pending.prior;
            return;
        }
        if let Some(row) = self.row_mut(pending.id) {
            if row.pending == Some(request) {
                row.summary.status = pending.prior;
                row.pending = None;
            }
        }
    }
}

/// Rolls an optimistic change back if its caller stops waiting for the store.
struct PendingGuard<'a> {
    console: &'a AdminConsole,
    request: u64,
    armed: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(request = self.request, "Status change abandoned");
            self.console.lock().rollback(self.request);
        }
    }
}

/// One admin session over the order store.
///
/// Cloning shares the session, so an auto-refresh loop and the operator's own
/// actions see the same rows.
#[derive(Clone)]
pub struct AdminConsole {
    client: OrderClient,
    role: Role,
    auto_refresh: bool,
    refresh_interval: Duration,
    session: Arc<Mutex<Session>>,
}

impl AdminConsole {
    pub fn new(client: OrderClient, role: Role, config: &AdminConfig) -> Self {
        let view = AdminView {
            filter: OrderFilter::default(),
            page: 1,
            page_size: config.page_size.max(1),
            total: 0,
            rows: Vec::new(),
            last_error: None,
        };
        Self {
            client,
            role,
            auto_refresh: config.auto_refresh,
            refresh_interval: config.refresh_interval(),
            session: Arc::new(Mutex::new(Session {
                view,
                pending: HashMap::new(),
                next_request: 0,
                generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn view(&self) -> AdminView {
        self.lock().view.clone()
    }

    /// Clears and returns the last error shown to the operator.
    pub fn take_error(&self) -> Option<AdminError> {
        self.lock().view.last_error.take()
    }

    /// Re-fetches the current page with the current filter.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), AdminError> {
        let (filter, request, generation) = {
            let session = self.lock();
            let view = &session.view;
            (
                view.filter.clone(),
                PageRequest::new(view.page, view.page_size),
                session.generation,
            )
        };

        let result = self.client.list_orders(filter, request, self.role).await;

        let mut session = self.lock();
        match result {
            Ok(page) if session.generation == generation => {
                debug!(total = page.total, rows = page.items.len(), "Listing refreshed");
                session.apply_page(page);
                Ok(())
            }
            Ok(_) => {
                debug!("Discarding listing for superseded criteria");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Listing refresh failed");
                let error = AdminError::Refresh(e);
                session.view.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Replaces the filter, returns to page 1 and refreshes.
    pub async fn set_filter(&self, filter: OrderFilter) -> Result<(), AdminError> {
        {
            let mut session = self.lock();
            session.view.filter = filter;
            session.view.page = 1;
            session.generation += 1;
        }
        self.refresh().await
    }

    pub async fn set_page(&self, page: usize) -> Result<(), AdminError> {
        {
            let mut session = self.lock();
            session.view.page = page.max(1);
            session.generation += 1;
        }
        self.refresh().await
    }

    pub async fn advance(&self, id: OrderId) -> Result<TransitionOutcome, AdminError> {
        self.change_status(id, Direction::Forward).await
    }

    pub async fn retreat(&self, id: OrderId) -> Result<TransitionOutcome, AdminError> {
        self.change_status(id, Direction::Backward).await
    }

    /// Shows the step at once, then settles the row with the store's answer.
    /// On rejection the row goes back to its prior status and the reason is kept
    /// in [`AdminView::last_error`].
    #[instrument(skip(self))]
    async fn change_status(
        &self,
        id: OrderId,
        direction: Direction,
    ) -> Result<TransitionOutcome, AdminError> {
        let request = self.lock().apply_optimistic(id, direction);
        let mut guard = PendingGuard {
            console: self,
            request,
            armed: true,
        };

        let result = self.client.step(id, direction, self.role).await;
        guard.armed = false;

        let mut session = self.lock();
        match result {
            Ok(outcome) => {
                session.commit(request, &outcome);
                if outcome.changed {
                    info!(%id, status = %outcome.order.status, "Status change committed");
                }
                Ok(outcome)
            }
            Err(reason) => {
                session.rollback(request);
                warn!(%id, error = %reason, "Status change rolled back");
                let error = AdminError::Rejected { id, reason };
                session.view.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Starts the periodic refresh if the session has it enabled.
    pub fn spawn_auto_refresh(&self) -> Option<RefreshHandle> {
        self.auto_refresh
            .then(|| self.spawn_refresh_loop(self.refresh_interval))
    }

    /// Refreshes every `interval` until the handle is stopped or dropped.
    pub fn spawn_refresh_loop(&self, interval: Duration) -> RefreshHandle {
        let console = self.clone();
        let (shutdown_tx, mut shutdown) = oneshot::channel::<()>();
        let span = tracing::info_span!("admin_refresh", role = ?self.role);

        let task = tokio::spawn(
            async move {
                info!(?interval, "Auto-refresh started");
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = ticker.tick() => {}
                    }
                    tokio::select! {
                        _ = &mut shutdown => break,
                        // Failures are already on the view.
                        _ = console.refresh() => {}
                    }
                }
                info!("Auto-refresh stopped");
            }
            .instrument(span),
        );

        RefreshHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running auto-refresh loop. Dropping it stops the loop.
pub struct RefreshHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Auto-refresh task ended abnormally");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
