// Live sync controller - MANUAL/LIVE state machine driving the history poll
use crate::application::cardio_gateway::CardioGateway;
use crate::application::dashboard_store::{DashboardState, DashboardStore, RequestSource};
use crate::domain::analysis::AnalysisResult;
use crate::domain::history::{HistoryEntry, HistoryRecord, HISTORY_CAPACITY};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Manual,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied,
    /// Server has no readings yet
    Empty,
    Superseded,
    Failed,
}

/// One poll of the history endpoint and how its answer lands on the dashboard.
#[derive(Clone)]
pub struct LivePoller {
    gateway: Arc<dyn CardioGateway>,
    store: DashboardStore,
}

impl LivePoller {
    pub fn new(gateway: Arc<dyn CardioGateway>, store: DashboardStore) -> Self {
        Self { gateway, store }
    }

    pub async fn poll_once(&self) -> PollOutcome {
        let epoch = self.store.issue_epoch(RequestSource::Live).await;

        let records = match self.gateway.fetch_history().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("History poll failed: {}", e);
                return PollOutcome::Failed;
            }
        };

        if records.is_empty() {
            tracing::debug!("History poll returned no readings");
            return PollOutcome::Empty;
        }

        let applied = self
            .store
            .commit(epoch, |state| apply_history(state, &records))
            .await;

        if applied {
            tracing::debug!("Live reading applied ({} records)", records.len());
            PollOutcome::Applied
        } else {
            tracing::debug!("Discarding superseded history response (epoch {})", epoch.value());
            PollOutcome::Superseded
        }
    }

    async fn run(self, period: Duration) {
        // First poll one full period after entering LIVE.
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }
}

// `records` is newest-first and non-empty.
fn apply_history(state: &mut DashboardState, records: &[HistoryRecord]) {
    let Some(latest) = records.first() else {
        return;
    };

    state.vitals.apply_live_reading(latest);
    state.analysis = Some(AnalysisResult::from_record(latest));

    let entries = records
        .iter()
        .take(HISTORY_CAPACITY)
        .rev()
        .map(HistoryEntry::from_record)
        .collect();
    state.history.replace_all(entries);
}

/// Recurring poll task; aborted when dropped.
struct LiveTimer {
    handle: JoinHandle<()>,
}

impl LiveTimer {
    fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(task),
        }
    }
}

impl Drop for LiveTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Owns the dashboard mode. LIVE holds exactly one [`LiveTimer`]; MANUAL holds none.
pub struct LiveSyncController {
    poller: LivePoller,
    period: Duration,
    timer: Mutex<Option<LiveTimer>>,
}

impl LiveSyncController {
    pub fn new(gateway: Arc<dyn CardioGateway>, store: DashboardStore, period: Duration) -> Self {
        Self {
            poller: LivePoller::new(gateway, store),
            period,
            timer: Mutex::new(None),
        }
    }

    pub async fn set_mode(&self, mode: Mode) -> bool {
        match mode {
            Mode::Live => self.start_live().await,
            Mode::Manual => self.stop_live().await,
        }
    }

    /// MANUAL → LIVE. Returns false (and starts nothing) if already LIVE.
    pub async fn start_live(&self) -> bool {
        let mut timer = self.timer.lock().await;
        if timer.is_some() {
            tracing::debug!("Live mode already active");
            return false;
        }

        *timer = Some(LiveTimer::spawn(self.poller.clone().run(self.period)));
        self.poller.store.set_mode(Mode::Live).await;
        tracing::info!("Live mode started (polling every {:?})", self.period);
        true
    }

    /// LIVE → MANUAL. Returns false if already MANUAL.
    pub async fn stop_live(&self) -> bool {
        let mut timer = self.timer.lock().await;
        let Some(active) = timer.take() else {
            tracing::debug!("Live mode already stopped");
            return false;
        };
        drop(active);

        // Anything the aborted poll still had in flight is now stale.
        self.poller.store.issue_epoch(RequestSource::Live).await;
        self.poller.store.set_mode(Mode::Manual).await;
        tracing::info!("Live mode stopped");
        true
    }
}
