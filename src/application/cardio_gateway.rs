// Gateway trait for the remote analysis/history/report service
use crate::domain::analysis::AnalysisResult;
use crate::domain::history::HistoryRecord;
use crate::domain::vitals::VitalsSnapshot;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Request rejected, timed out, or answered with a non-success status
    #[error("network failure: {0}")]
    NetworkFailure(String),
    /// Body did not parse or lacked expected fields
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub patient_name: String,
    pub patient_age: u32,
}

impl Default for ReportRequest {
    fn default() -> Self {
        Self {
            patient_name: "John Doe".to_string(),
            patient_age: 45,
        }
    }
}

#[async_trait]
pub trait CardioGateway: Send + Sync {
    /// Submit a snapshot for risk analysis
    async fn analyze(&self, vitals: &VitalsSnapshot) -> Result<AnalysisResult, GatewayError>;

    /// Fetch stored readings, newest first
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, GatewayError>;

    /// Download the PDF summary report
    async fn download_report(&self, request: &ReportRequest) -> Result<Bytes, GatewayError>;

    /// Delete all stored readings
    async fn clear_history(&self) -> Result<(), GatewayError>;
}

#[cfg(test)]
pub mod stub {
    use super::*;
    use crate::domain::analysis::RiskLevel;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory gateway with canned responses and call counters.
    pub struct StubGateway {
        analysis: Mutex<Result<AnalysisResult, GatewayError>>,
        history: Mutex<Result<Vec<HistoryRecord>, GatewayError>>,
        analysis_delay: Mutex<Option<Duration>>,
        last_payload: Mutex<Option<VitalsSnapshot>>,
        analyze_calls: AtomicUsize,
        history_calls: AtomicUsize,
    }

    impl StubGateway {
        pub fn new() -> Self {
            Self {
                analysis: Mutex::new(Ok(analysis(3.0, RiskLevel::Moderate))),
                history: Mutex::new(Ok(Vec::new())),
                analysis_delay: Mutex::new(None),
                last_payload: Mutex::new(None),
                analyze_calls: AtomicUsize::new(0),
                history_calls: AtomicUsize::new(0),
            }
        }

        pub fn set_analysis(&self, result: Result<AnalysisResult, GatewayError>) {
            *self.analysis.lock().unwrap() = result;
        }

        pub fn set_history(&self, result: Result<Vec<HistoryRecord>, GatewayError>) {
            *self.history.lock().unwrap() = result;
        }

        pub fn set_analysis_delay(&self, delay: Duration) {
            *self.analysis_delay.lock().unwrap() = Some(delay);
        }

        pub fn last_payload(&self) -> Option<VitalsSnapshot> {
            *self.last_payload.lock().unwrap()
        }

        pub fn analyze_calls(&self) -> usize {
            self.analyze_calls.load(Ordering::SeqCst)
        }

        pub fn history_calls(&self) -> usize {
            self.history_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CardioGateway for StubGateway {
        async fn analyze(&self, vitals: &VitalsSnapshot) -> Result<AnalysisResult, GatewayError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_payload.lock().unwrap() = Some(*vitals);
            let delay = *self.analysis_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.analysis.lock().unwrap().clone()
        }

        async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, GatewayError> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.history.lock().unwrap().clone()
        }

        async fn download_report(&self, _request: &ReportRequest) -> Result<Bytes, GatewayError> {
            Ok(Bytes::from_static(b"%PDF-1.4"))
        }

        async fn clear_history(&self) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    pub fn analysis(risk_score: f64, risk_level: RiskLevel) -> AnalysisResult {
        AnalysisResult {
            risk_score,
            risk_level,
            explanation: "Blood pressure is elevated. Monitor closely.".to_string(),
            emergency_alert: None,
        }
    }

    pub fn record(risk_score: f64, risk_level: RiskLevel, heart_rate: f64) -> HistoryRecord {
        HistoryRecord {
            timestamp: "2025-03-04T09:15:27".to_string(),
            heart_rate,
            blood_pressure_systolic: 150.0,
            blood_pressure_diastolic: 95.0,
            oxygen_saturation: 92.0,
            temperature: 38.2,
            risk_score,
            risk_level,
            explanation: "Tachycardia. Hypoxemia.".to_string(),
        }
    }
}
