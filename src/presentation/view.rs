// JSON view of the dashboard for chart front ends
use crate::application::dashboard_store::DashboardSnapshot;
use crate::application::live_sync::Mode;
use crate::domain::analysis::{AnalysisResult, EmergencyAlert, RiskLevel};
use crate::domain::history::HistoryEntry;
use crate::domain::vitals::VitalsSnapshot;
use crate::domain::waveform::WaveformPoint;
use crate::presentation::risk_presentation::{color_for, explanation_bullets};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub mode: Mode,
    pub busy: bool,
    pub vitals: VitalsSnapshot,
    pub analysis: Option<AnalysisView>,
    pub history: Vec<HistoryEntry>,
    pub waveform: Vec<WaveformPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub color: &'static str,
    pub explanation: String,
    pub bullets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_alert: Option<EmergencyAlert>,
}

impl From<AnalysisResult> for AnalysisView {
    fn from(result: AnalysisResult) -> Self {
        Self {
            color: color_for(&result.risk_level),
            bullets: explanation_bullets(&result.explanation),
            risk_score: result.risk_score,
            risk_level: result.risk_level,
            explanation: result.explanation,
            emergency_alert: result.emergency_alert,
        }
    }
}

impl From<DashboardSnapshot> for DashboardView {
    fn from(snapshot: DashboardSnapshot) -> Self {
        Self {
            mode: snapshot.mode,
            busy: snapshot.busy,
            vitals: snapshot.vitals,
            analysis: snapshot.analysis.map(AnalysisView::from),
            history: snapshot.history,
            waveform: snapshot.waveform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_store::DashboardStore;

    #[test]
    fn test_view_serializes_dashboard() {
        let mut snapshot = DashboardStore::new().snapshot();
        snapshot.analysis = Some(AnalysisResult {
            risk_score: 9.0,
            risk_level: RiskLevel::Critical,
            explanation: "ST elevation. Call now.".to_string(),
            emergency_alert: Some(EmergencyAlert::critical_event()),
        });

        let json = serde_json::to_value(DashboardView::from(snapshot)).unwrap();

        assert_eq!(json["mode"], "MANUAL");
        assert_eq!(json["busy"], false);
        assert_eq!(json["waveform"].as_array().map(Vec::len), Some(100));
        assert_eq!(json["analysis"]["color"], "#dc2626");
        assert_eq!(json["analysis"]["risk_level"], "CRITICAL");
        assert_eq!(json["analysis"]["bullets"][1], "Call now.");
        assert_eq!(json["analysis"]["emergency_alert"]["priority"], "IMMEDIATE");
    }
}
