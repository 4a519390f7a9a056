// Analysis controller - manual one-shot risk analysis
use crate::application::cardio_gateway::CardioGateway;
use crate::application::dashboard_store::{DashboardStore, RequestSource};
use crate::domain::analysis::AnalysisResult;
use crate::domain::history::{local_time_label, HistoryEntry};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Result stored and one history entry appended
    Applied(AnalysisResult),
    /// A newer request already owns the dashboard
    Superseded,
    /// Request failed; nothing changed
    Failed,
}

#[derive(Clone)]
pub struct AnalysisController {
    gateway: Arc<dyn CardioGateway>,
    store: DashboardStore,
}

impl AnalysisController {
    pub fn new(gateway: Arc<dyn CardioGateway>, store: DashboardStore) -> Self {
        Self { gateway, store }
    }

    /// Send the current snapshot for analysis. Failures are logged and
    /// otherwise swallowed.
    pub async fn analyze(&self) -> AnalysisOutcome {
        let _busy = self.store.begin_busy();

        let vitals = self.store.vitals().await;
        let epoch = self.store.issue_epoch(RequestSource::Manual).await;

        let result = match self.gateway.analyze(&vitals).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Analysis request failed: {}", e);
                return AnalysisOutcome::Failed;
            }
        };

        // The entry pairs the snapshot that was sent with the score it earned.
        let entry = HistoryEntry::from_analysis(local_time_label(), &vitals, result.risk_score);
        let stored = result.clone();
        let applied = self
            .store
            .commit(epoch, move |state| {
                state.analysis = Some(stored);
                state.history.append_bounded(entry);
            })
            .await;

        if !applied {
            tracing::debug!("Discarding superseded analysis response (epoch {})", epoch.value());
            return AnalysisOutcome::Superseded;
        }

        tracing::info!(
            "Analysis applied: {} (score {})",
            result.risk_level,
            result.risk_score
        );
        AnalysisOutcome::Applied(result)
    }
}
