// HTTP request handlers
use crate::application::cardio_gateway::ReportRequest;
use crate::application::live_sync::Mode;
use crate::domain::vitals::{Scenario, VitalField, VitalsSnapshot};
use crate::presentation::app_state::AppState;
use crate::presentation::view::DashboardView;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub patient_name: Option<String>,
    pub patient_age: Option<u32>,
}

fn current_view(state: &AppState) -> Json<DashboardView> {
    Json(DashboardView::from(state.store.snapshot()))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard: vitals, analysis, history and waveform
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    current_view(&state)
}

/// Server-sent events carrying a fresh view after every change
pub async fn stream_dashboard(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.store.subscribe();

    let stream = async_stream::stream! {
        loop {
            let view = DashboardView::from(rx.borrow_and_update().clone());
            match Event::default().json_data(&view) {
                Ok(event) => {
                    yield Ok::<Event, Infallible>(event);
                }
                Err(e) => {
                    tracing::warn!("Failed to encode dashboard event: {}", e);
                }
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Edit one vital from raw form text
pub async fn edit_vital(
    Path(field): Path<String>,
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<DashboardView>, StatusCode> {
    let field: VitalField = field.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    let value = state.store.edit_vital(field, &body).await;
    tracing::debug!("Edited {} = {}", field, value);
    Ok(current_view(&state))
}

/// Load a canned scenario into the form
pub async fn load_preset(
    Path(scenario): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardView>, StatusCode> {
    let scenario: Scenario = scenario.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    state
        .store
        .replace_vitals(VitalsSnapshot::preset(scenario))
        .await;
    Ok(current_view(&state))
}

/// Run one manual analysis. Failures leave the view unchanged.
pub async fn analyze(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    state.analysis.analyze().await;
    current_view(&state)
}

pub async fn enter_live(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    state.live.set_mode(Mode::Live).await;
    current_view(&state)
}

pub async fn enter_manual(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    state.live.set_mode(Mode::Manual).await;
    current_view(&state)
}

/// Proxy the PDF report as a download
pub async fn download_report(
    Query(query): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let defaults = ReportRequest::default();
    let request = ReportRequest {
        patient_name: query.patient_name.unwrap_or(defaults.patient_name),
        patient_age: query.patient_age.unwrap_or(defaults.patient_age),
    };

    match state.gateway.download_report(&request).await {
        Ok(pdf) => {
            let disposition = format!(
                "attachment; filename=cardiosense_report_{}.pdf",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            );
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                pdf,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Report download failed: {}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Clear stored readings upstream, then the local buffer
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardView>, StatusCode> {
    if let Err(e) = state.gateway.clear_history().await {
        tracing::warn!("Clearing history failed: {}", e);
        return Err(StatusCode::BAD_GATEWAY);
    }
    state.store.clear_history().await;
    Ok(current_view(&state))
}
