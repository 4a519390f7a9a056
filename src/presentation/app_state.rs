// Application state for HTTP handlers
use crate::application::analysis_controller::AnalysisController;
use crate::application::cardio_gateway::CardioGateway;
use crate::application::dashboard_store::DashboardStore;
use crate::application::live_sync::LiveSyncController;
use std::sync::Arc;

pub struct AppState {
    pub store: DashboardStore,
    pub analysis: AnalysisController,
    pub live: LiveSyncController,
    pub gateway: Arc<dyn CardioGateway>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn CardioGateway>,
        store: DashboardStore,
        poll_interval: std::time::Duration,
    ) -> Self {
        Self {
            analysis: AnalysisController::new(gateway.clone(), store.clone()),
            live: LiveSyncController::new(gateway.clone(), store.clone(), poll_interval),
            store,
            gateway,
        }
    }
}
