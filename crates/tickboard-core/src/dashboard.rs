//! Event loop tying the catalog, fetcher, scheduler and view together.
//!
//! ```text
//!   Selector::select ─┐
//!   prefetch timer ───┼──▶ mpsc ──▶ EventLoop ──▶ PresentationSink
//!   fetch tasks ──────┘               │  owns Catalog + ViewController
//!        ▲                            │
//!        └──── tokio::spawn ◀─────────┘  (one task per request)
//! ```
//!
//! The loop is the only code that touches the catalog, the view controller or
//! the sink. Fetch tasks and the prefetch timer only send messages, so every
//! check-then-act on an item happens without interleaving and without locks.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::config::DashboardConfig;
use crate::domain::{ItemId, Prediction};
use crate::error::{CatalogLoadError, CoreError, DataKind, FetchFailed};
use crate::fetcher::{DataFetcher, HistoryPayload};
use crate::http_client::HttpClient;
use crate::scheduler::PrefetchScheduler;
use crate::sink::{NavEntry, PresentationSink};
use crate::view::{Selection, ViewController};

enum Event {
    Select(usize),
    PrefetchDue(ItemId),
    PrefetchFinished,
    HistoryDone {
        id: ItemId,
        result: Result<HistoryPayload, FetchFailed>,
    },
    PredictionDone {
        id: ItemId,
        result: Result<Prediction, FetchFailed>,
    },
    Snapshot(oneshot::Sender<Catalog>),
    WhenSettled(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable handle a front end uses to report navigation clicks.
#[derive(Debug, Clone)]
pub struct Selector {
    tx: UnboundedSender<Event>,
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select(index) => write!(f, "Select({index})"),
            Self::PrefetchDue(id) => write!(f, "PrefetchDue({id})"),
            Self::PrefetchFinished => f.write_str("PrefetchFinished"),
            Self::HistoryDone { id, result } => {
                write!(f, "HistoryDone({id}, ok={})", result.is_ok())
            }
            Self::PredictionDone { id, result } => {
                write!(f, "PredictionDone({id}, ok={})", result.is_ok())
            }
            Self::Snapshot(_) => f.write_str("Snapshot"),
            Self::WhenSettled(_) => f.write_str("WhenSettled"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl Selector {
    /// Select the navigation entry at `index`. Returns `false` once the
    /// dashboard has stopped.
    pub fn select(&self, index: usize) -> bool {
        self.tx.send(Event::Select(index)).is_ok()
    }
}

/// Entry point: load the catalog and start the event loop.
#[derive(Debug)]
pub struct Dashboard;

impl Dashboard {
    /// Fetch the catalog, render the navigation list, start the background
    /// prefetch pass and return a handle to the running dashboard.
    ///
    /// A catalog load failure is returned as-is; nothing is started.
    pub async fn start(
        config: DashboardConfig,
        http_client: Arc<dyn HttpClient>,
        mut sink: Box<dyn PresentationSink>,
    ) -> Result<DashboardHandle, CatalogLoadError> {
        let fetcher = DataFetcher::new(http_client, &config);
        let catalog = fetcher.fetch_list().await.inspect_err(|e| {
            error!(error = %e, api_url = %config.api_url, "failed to load catalog");
        })?;
        info!(items = catalog.len(), "catalog loaded");

        let (tx, rx) = mpsc::unbounded_channel();
        sink.render_navigation(
            &NavEntry::from_catalog(&catalog),
            Selector { tx: tx.clone() },
        );

        let plan = PrefetchScheduler::new(config.prefetch_stagger).plan(&catalog);
        let prefetch_tx = tx.clone();
        tokio::spawn(async move {
            PrefetchScheduler::run(plan, |id| prefetch_tx.send(Event::PrefetchDue(id)).is_ok())
                .await;
            let _ = prefetch_tx.send(Event::PrefetchFinished);
        });

        let event_loop = EventLoop {
            len: catalog.len(),
            catalog,
            view: ViewController::new(),
            sink,
            fetcher,
            tx: tx.downgrade(),
            in_flight: 0,
            prefetch_finished: false,
            settle_waiters: Vec::new(),
        };
        let task = tokio::spawn(event_loop.run(rx));

        Ok(DashboardHandle {
            tx,
            task: Some(task),
        })
    }
}

/// Handle to a running dashboard. Dropping it stops the event loop.
#[derive(Debug)]
pub struct DashboardHandle {
    tx: UnboundedSender<Event>,
    task: Option<JoinHandle<()>>,
}

impl DashboardHandle {
    pub fn selector(&self) -> Selector {
        Selector {
            tx: self.tx.clone(),
        }
    }

    pub fn select(&self, index: usize) -> Result<(), CoreError> {
        self.send(Event::Select(index))
    }

    /// Copy of the catalog as the event loop currently sees it.
    pub async fn snapshot(&self) -> Result<Catalog, CoreError> {
        let (reply, response) = oneshot::channel();
        self.send(Event::Snapshot(reply))?;
        response.await.map_err(|_| CoreError::Stopped)
    }

    /// Resolves once the prefetch pass has fired every entry and every
    /// request issued so far has reported back.
    pub async fn wait_until_settled(&self) -> Result<(), CoreError> {
        let (reply, response) = oneshot::channel();
        self.send(Event::WhenSettled(reply))?;
        response.await.map_err(|_| CoreError::Stopped)
    }

    /// Stop the event loop and wait for it to exit. In-flight requests are
    /// not cancelled; their results are simply dropped.
    pub async fn shutdown(mut self) -> Result<(), CoreError> {
        let _ = self.tx.send(Event::Shutdown);
        match self.task.take() {
            Some(task) => task.await.map_err(|_| CoreError::Stopped),
            None => Ok(()),
        }
    }

    fn send(&self, event: Event) -> Result<(), CoreError> {
        self.tx.send(event).map_err(|_| CoreError::Stopped)
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.tx.send(Event::Shutdown);
        }
    }
}

struct EventLoop {
    catalog: Catalog,
    len: usize,
    view: ViewController,
    sink: Box<dyn PresentationSink>,
    fetcher: DataFetcher,
    tx: WeakUnboundedSender<Event>,
    in_flight: usize,
    prefetch_finished: bool,
    settle_waiters: Vec<oneshot::Sender<()>>,
}

impl EventLoop {
    async fn run(mut self, mut rx: UnboundedReceiver<Event>) {
        while let Some(event) = rx.recv().await {
            debug!(?event, "dashboard event");
            match event {
                Event::Select(index) => self.on_select(index),
                Event::PrefetchDue(id) => self.on_prefetch_due(id),
                Event::PrefetchFinished => {
                    self.prefetch_finished = true;
                    debug!(
                        fetched = self.catalog.fetched_count(),
                        items = self.len,
                        "prefetch pass finished scheduling"
                    );
                }
                Event::HistoryDone { id, result } => self.on_history_done(id, result),
                Event::PredictionDone { id, result } => self.on_prediction_done(id, result),
                Event::Snapshot(reply) => {
                    let _ = reply.send(self.catalog.clone());
                }
                Event::WhenSettled(reply) => self.settle_waiters.push(reply),
                Event::Shutdown => break,
            }
            self.notify_if_settled();
        }
        debug!("dashboard event loop stopped");
    }

    fn on_select(&mut self, index: usize) {
        if self.catalog.try_get(index).is_none() {
            warn!(index, items = self.len, "ignoring selection outside the catalog");
            return;
        }

        match self.view.select_item(&self.catalog, self.sink.as_mut(), index) {
            Selection::FetchNow(id) => {
                debug!(item = %id, "selected item not cached; fetching now");
                self.fetch(id);
            }
            Selection::Unavailable => {
                debug!(index, "selected item has no data; history fetch failed earlier");
            }
            Selection::Rendered | Selection::Pending => {}
        }
    }

    fn on_prefetch_due(&mut self, id: ItemId) {
        let item = self.catalog.item(id);
        if item.is_fetched() || item.attempted(DataKind::History) {
            debug!(item = %id, symbol = %item.symbol(), "prefetch skipped; already requested");
            return;
        }
        self.fetch(id);
    }

    fn fetch(&mut self, id: ItemId) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        let symbol = self.catalog.item(id).symbol().clone();

        if self.catalog.begin_attempt(id, DataKind::History) {
            self.in_flight += 1;
            let fetcher = self.fetcher.clone();
            let tx = tx.clone();
            let symbol = symbol.clone();
            tokio::spawn(async move {
                let result = fetcher.fetch_history(&symbol).await;
                let _ = tx.send(Event::HistoryDone { id, result });
            });
        }

        if self.catalog.begin_attempt(id, DataKind::Prediction) {
            self.in_flight += 1;
            let fetcher = self.fetcher.clone();
            tokio::spawn(async move {
                let result = fetcher.fetch_prediction(&symbol).await;
                let _ = tx.send(Event::PredictionDone { id, result });
            });
        }
    }

    fn on_history_done(&mut self, id: ItemId, result: Result<HistoryPayload, FetchFailed>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(payload) => {
                // Any prediction that beat the history here is already in the catalog.
                let rendered = self.view.on_fetch_complete(
                    &mut self.catalog,
                    self.sink.as_mut(),
                    id,
                    payload.history,
                    payload.range52,
                    None,
                );
                debug!(item = %id, rendered, "history cached");
            }
            Err(failure) => {
                warn!(
                    item = %id,
                    symbol = %failure.symbol,
                    reason = %failure.reason,
                    "history fetch failed"
                );
                self.catalog.record_failure(id, DataKind::History);
            }
        }
    }

    fn on_prediction_done(&mut self, id: ItemId, result: Result<Prediction, FetchFailed>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(prediction) => {
                let rendered = self.view.on_prediction_complete(
                    &mut self.catalog,
                    self.sink.as_mut(),
                    id,
                    prediction,
                );
                debug!(item = %id, rendered, "prediction cached");
            }
            Err(failure) => {
                warn!(
                    item = %id,
                    symbol = %failure.symbol,
                    reason = %failure.reason,
                    "prediction fetch failed"
                );
                self.catalog.record_failure(id, DataKind::Prediction);
            }
        }
    }

    fn notify_if_settled(&mut self) {
        if !self.prefetch_finished || self.in_flight > 0 || self.settle_waiters.is_empty() {
            return;
        }
        for waiter in self.settle_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }
}
