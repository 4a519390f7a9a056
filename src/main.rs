// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::{get, post, put}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::cardio_gateway::CardioGateway;
use crate::application::dashboard_store::DashboardStore;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::http_gateway::HttpCardioGateway;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    analyze, clear_history, download_report, edit_vital, enter_live, enter_manual, get_dashboard,
    health_check, load_preset, stream_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Create gateway (infrastructure layer)
    let gateway: Arc<dyn CardioGateway> = Arc::new(HttpCardioGateway::new(
        settings.api.base_url.clone(),
        settings.api.timeout(),
    )?);

    // Create store and controllers (application layer)
    let state = Arc::new(AppState::new(
        gateway,
        DashboardStore::new(),
        settings.live.poll_interval(),
    ));

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/events", get(stream_dashboard))
        .route("/vitals/:field", put(edit_vital))
        .route("/vitals/preset/:scenario", post(load_preset))
        .route("/analyze", post(analyze))
        .route("/mode/live", post(enter_live))
        .route("/mode/manual", post(enter_manual))
        .route("/report/pdf", get(download_report))
        .route("/history/clear", post(clear_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let addr: SocketAddr = settings.server.bind_addr.parse()?;
    tracing::info!(
        "Starting cardiosense dashboard on {} (analysis service {})",
        addr,
        settings.api.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Leave live mode so the poll timer is torn down before exit.
    state.live.stop_live().await;
    tracing::info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
