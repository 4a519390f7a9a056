// Dashboard store - owned dashboard state with change notification
use crate::application::live_sync::Mode;
use crate::domain::analysis::AnalysisResult;
use crate::domain::history::{HistoryBuffer, HistoryEntry};
use crate::domain::vitals::{VitalField, VitalsSnapshot};
use crate::domain::waveform::{WaveformPoint, WaveformSynthesizer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{watch, RwLock};

/// Which controller issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSource {
    Manual,
    Live,
}

/// Position of a request in the store-wide issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch {
    value: u64,
    source: RequestSource,
}

impl Epoch {
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// Admits a response only if its request is still the newest of its source
/// and nothing issued later has been committed already.
#[derive(Debug, Default)]
struct EpochGate {
    issued: u64,
    latest_manual: u64,
    latest_live: u64,
    committed: u64,
}

impl EpochGate {
    fn issue(&mut self, source: RequestSource) -> Epoch {
        self.issued += 1;
        match source {
            RequestSource::Manual => self.latest_manual = self.issued,
            RequestSource::Live => self.latest_live = self.issued,
        }
        Epoch {
            value: self.issued,
            source,
        }
    }

    fn admit(&mut self, epoch: Epoch) -> bool {
        let latest = match epoch.source {
            RequestSource::Manual => self.latest_manual,
            RequestSource::Live => self.latest_live,
        };
        if epoch.value != latest || epoch.value <= self.committed {
            return false;
        }
        self.committed = epoch.value;
        true
    }
}

/// Everything the dashboard shows. Controllers mutate it only through
/// [`DashboardStore::commit`].
#[derive(Debug)]
pub struct DashboardState {
    pub vitals: VitalsSnapshot,
    pub analysis: Option<AnalysisResult>,
    pub history: HistoryBuffer,
    mode: Mode,
    synthesizer: WaveformSynthesizer,
    epochs: EpochGate,
}

impl DashboardState {
    fn new(vitals: VitalsSnapshot) -> Self {
        Self {
            vitals,
            analysis: None,
            history: HistoryBuffer::new(),
            mode: Mode::Manual,
            synthesizer: WaveformSynthesizer::new(),
            epochs: EpochGate::default(),
        }
    }

    fn snapshot(&mut self, busy: bool) -> DashboardSnapshot {
        let waveform = self.synthesizer.points(&self.vitals).to_vec();
        DashboardSnapshot {
            mode: self.mode,
            busy,
            vitals: self.vitals,
            analysis: self.analysis.clone(),
            history: self.history.to_vec(),
            waveform,
        }
    }
}

/// Published copy of the state after a change.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub mode: Mode,
    pub busy: bool,
    pub vitals: VitalsSnapshot,
    pub analysis: Option<AnalysisResult>,
    pub history: Vec<HistoryEntry>,
    pub waveform: Vec<WaveformPoint>,
}

#[derive(Clone)]
pub struct DashboardStore {
    state: Arc<RwLock<DashboardState>>,
    in_flight: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<DashboardSnapshot>>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::with_vitals(VitalsSnapshot::default())
    }

    pub fn with_vitals(vitals: VitalsSnapshot) -> Self {
        let mut state = DashboardState::new(vitals);
        let (notifier, _) = watch::channel(state.snapshot(false));
        Self {
            state: Arc::new(RwLock::new(state)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            notifier: Arc::new(notifier),
        }
    }

    /// Latest published state
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.notifier.borrow().clone()
    }

    /// Receive a fresh snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.notifier.subscribe()
    }

    pub async fn vitals(&self) -> VitalsSnapshot {
        self.state.read().await.vitals
    }

    /// Apply one user edit; returns the value stored.
    pub async fn edit_vital(&self, field: VitalField, raw: &str) -> f64 {
        let value = field.parse_input(raw);
        self.mutate(|state| state.vitals.set(field, value)).await;
        value
    }

    pub async fn replace_vitals(&self, vitals: VitalsSnapshot) {
        self.mutate(|state| state.vitals = vitals).await;
    }

    pub async fn clear_history(&self) {
        self.mutate(|state| state.history.clear()).await;
    }

    pub(crate) async fn set_mode(&self, mode: Mode) {
        self.mutate(|state| state.mode = mode).await;
    }

    pub async fn issue_epoch(&self, source: RequestSource) -> Epoch {
        self.state.write().await.epochs.issue(source)
    }

    /// Run `apply` in one critical section if `epoch` is still current.
    /// Returns false when the response was superseded.
    pub async fn commit<F>(&self, epoch: Epoch, apply: F) -> bool
    where
        F: FnOnce(&mut DashboardState),
    {
        self.mutate(|state| {
            if !state.epochs.admit(epoch) {
                return false;
            }
            apply(state);
            true
        })
        .await
    }

    /// Mark a request in flight until the returned guard is dropped.
    pub fn begin_busy(&self) -> BusyGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.publish_busy();
        BusyGuard {
            store: self.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    async fn mutate<R>(&self, apply: impl FnOnce(&mut DashboardState) -> R) -> R {
        let mut state = self.state.write().await;
        let result = apply(&mut *state);
        let mut snapshot = state.snapshot(false);
        // Busy is read under the channel lock, same as `publish_busy`.
        let in_flight = Arc::clone(&self.in_flight);
        self.notifier.send_modify(|current| {
            snapshot.busy = in_flight.load(Ordering::SeqCst) > 0;
            *current = snapshot;
        });
        result
    }

    fn publish_busy(&self) {
        let in_flight = Arc::clone(&self.in_flight);
        self.notifier
            .send_modify(|snapshot| snapshot.busy = in_flight.load(Ordering::SeqCst) > 0);
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the busy indicator on every exit path, cancellation included.
pub struct BusyGuard {
    store: DashboardStore,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.store.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.store.publish_busy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::waveform::synthesize;

    #[tokio::test]
    async fn test_edit_resynthesizes_and_notifies() {
        let store = DashboardStore::new();
        let mut rx = store.subscribe();
        let _ = rx.borrow_and_update();

        store.edit_vital(VitalField::StSegmentElevation, "0.2").await;

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.vitals.st_segment_elevation, 0.2);
        assert_eq!(snapshot.waveform, synthesize(&snapshot.vitals));
        assert!((snapshot.waveform[45].y - 70.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unparsable_edit_stores_nan() {
        let store = DashboardStore::new();
        let value = store.edit_vital(VitalField::QrsDuration, "fast").await;

        assert!(value.is_nan());
        assert!(store.vitals().await.qrs_duration.is_nan());
        assert_eq!(store.snapshot().waveform.len(), 100);
    }

    #[tokio::test]
    async fn test_stale_epoch_from_same_source_is_discarded() {
        let store = DashboardStore::new();
        let first = store.issue_epoch(RequestSource::Manual).await;
        let second = store.issue_epoch(RequestSource::Manual).await;

        assert!(!store.commit(first, |state| state.history.clear()).await);
        assert!(store.commit(second, |state| state.history.clear()).await);
    }

    #[tokio::test]
    async fn test_older_epoch_loses_to_committed_newer_one() {
        let store = DashboardStore::new();
        let manual = store.issue_epoch(RequestSource::Manual).await;
        let live = store.issue_epoch(RequestSource::Live).await;

        assert!(store.commit(live, |_| {}).await);
        assert!(!store.commit(manual, |_| {}).await);
    }

    #[tokio::test]
    async fn test_older_epoch_wins_if_it_lands_first() {
        let store = DashboardStore::new();
        let manual = store.issue_epoch(RequestSource::Manual).await;
        let live = store.issue_epoch(RequestSource::Live).await;

        assert!(store.commit(manual, |_| {}).await);
        assert!(store.commit(live, |_| {}).await);
    }

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let store = DashboardStore::new();
        {
            let _outer = store.begin_busy();
            {
                let _inner = store.begin_busy();
                assert!(store.snapshot().busy);
            }
            assert!(store.snapshot().busy);
        }
        assert!(!store.is_busy());
        assert!(!store.snapshot().busy);
    }

    #[tokio::test]
    async fn test_mutation_carries_current_busy_flag() {
        let store = DashboardStore::new();

        let guard = store.begin_busy();
        store.clear_history().await;
        assert!(store.snapshot().busy);

        drop(guard);
        assert!(!store.snapshot().busy);
        store.replace_vitals(VitalsSnapshot::default()).await;
        assert!(!store.snapshot().busy);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_busy_settles_false_under_concurrent_mutations() {
        let store = DashboardStore::new();

        let mut tasks = Vec::new();
        for i in 0..64 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    let _guard = store.begin_busy();
                    tokio::task::yield_now().await;
                } else {
                    store.clear_history().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert!(!store.is_busy());
        assert!(!store.snapshot().busy);
    }
}
