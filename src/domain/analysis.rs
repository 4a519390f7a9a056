// Analysis domain model - risk assessment returned by the analysis service
use crate::domain::history::HistoryRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
    /// Any label the service sends that is not one of the four known levels.
    Unrecognized(String),
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::Unrecognized(label) => label,
        }
    }
}

impl From<String> for RiskLevel {
    fn from(label: String) -> Self {
        match label.as_str() {
            "LOW" => RiskLevel::Low,
            "MODERATE" => RiskLevel::Moderate,
            "HIGH" => RiskLevel::High,
            "CRITICAL" => RiskLevel::Critical,
            _ => RiskLevel::Unrecognized(label),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Unrecognized(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAlert {
    pub call_911: bool,
    pub reason: String,
    pub priority: String,
}

impl EmergencyAlert {
    pub fn critical_event() -> Self {
        Self {
            call_911: true,
            reason: "Critical cardiac event detected".to_string(),
            priority: "IMMEDIATE".to_string(),
        }
    }
}

/// One complete risk assessment; always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_alert: Option<EmergencyAlert>,
}

impl AnalysisResult {
    /// Rebuild an assessment from a stored reading. The history endpoint does
    /// not carry alerts, so a CRITICAL reading gets a synthesized one.
    pub fn from_record(record: &HistoryRecord) -> Self {
        let emergency_alert =
            (record.risk_level == RiskLevel::Critical).then(EmergencyAlert::critical_event);

        Self {
            risk_score: record.risk_score,
            risk_level: record.risk_level.clone(),
            explanation: record.explanation.clone(),
            emergency_alert,
        }
    }
}
