// History domain model - rolling window of past readings
use crate::domain::analysis::RiskLevel;
use crate::domain::vitals::VitalsSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 20;

// The history endpoint carries neither of these; entries rebuilt from it show
// the clinical baselines instead.
const PLACEHOLDER_ST: f64 = 0.0;
const PLACEHOLDER_T_WAVE: f64 = 0.3;

/// One stored reading as served by the history endpoint (newest first).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    pub heart_rate: f64,
    pub blood_pressure_systolic: f64,
    pub blood_pressure_diastolic: f64,
    pub oxygen_saturation: f64,
    pub temperature: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub explanation: String,
}

/// One point of the history chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub time: String,
    pub hr: f64,
    pub bp: f64,
    pub spo2: f64,
    pub risk: f64,
    pub st: f64,
    pub t_wave: f64,
}

impl HistoryEntry {
    pub fn from_analysis(time: String, vitals: &VitalsSnapshot, risk_score: f64) -> Self {
        Self {
            time,
            hr: vitals.heart_rate,
            bp: vitals.blood_pressure_systolic,
            spo2: vitals.oxygen_saturation,
            risk: risk_score,
            st: vitals.st_segment_elevation,
            t_wave: vitals.t_wave_amplitude,
        }
    }

    pub fn from_record(record: &HistoryRecord) -> Self {
        Self {
            time: display_time(&record.timestamp),
            hr: record.heart_rate,
            bp: record.blood_pressure_systolic,
            spo2: record.oxygen_saturation,
            risk: record.risk_score,
            st: PLACEHOLDER_ST,
            t_wave: PLACEHOLDER_T_WAVE,
        }
    }
}

/// Wall-clock label for a reading taken now.
pub fn local_time_label() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Reduce a server timestamp to `HH:MM:SS`, keeping it verbatim if it does not parse.
pub fn display_time(timestamp: &str) -> String {
    if let Ok(time) = chrono::DateTime::parse_from_rfc3339(timestamp) {
        return time.format("%H:%M:%S").to_string();
    }
    match chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(time) => time.format("%H:%M:%S").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Oldest-first buffer holding at most [`HISTORY_CAPACITY`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one entry, evicting the oldest when full.
    pub fn append_bounded(&mut self, entry: HistoryEntry) {
        while self.entries.len() >= HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Swap in a new oldest-first sequence. Only the newest entries that fit are kept.
    pub fn replace_all(&mut self, entries: Vec<HistoryEntry>) {
        let overflow = entries.len().saturating_sub(HISTORY_CAPACITY);
        self.entries = entries.into_iter().skip(overflow).collect();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            time: format!("t{}", n),
            hr: n as f64,
            bp: 120.0,
            spo2: 98.0,
            risk: 0.0,
            st: 0.0,
            t_wave: 0.3,
        }
    }

    #[test]
    fn test_append_evicts_oldest_at_capacity() {
        let mut buffer = HistoryBuffer::new();
        for n in 0..HISTORY_CAPACITY {
            buffer.append_bounded(entry(n));
        }
        assert_eq!(buffer.iter().count(), HISTORY_CAPACITY);

        buffer.append_bounded(entry(100));

        assert_eq!(buffer.iter().count(), HISTORY_CAPACITY);
        let times: Vec<_> = buffer.iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times.first(), Some(&"t1"));
        assert_eq!(times.last(), Some(&"t100"));
    }

    #[test]
    fn test_replace_all_keeps_newest_when_oversized() {
        let mut buffer = HistoryBuffer::new();
        buffer.append_bounded(entry(999));

        buffer.replace_all((0..25).map(entry).collect());

        assert_eq!(buffer.iter().count(), HISTORY_CAPACITY);
        assert_eq!(buffer.iter().next().map(|e| e.hr), Some(5.0));
        assert_eq!(buffer.iter().last().map(|e| e.hr), Some(24.0));
    }

    #[test]
    fn test_mixed_operations_never_exceed_capacity() {
        let mut buffer = HistoryBuffer::new();
        for round in 0..10 {
            for n in 0..(round * 7) {
                buffer.append_bounded(entry(n));
                assert!(buffer.iter().count() <= HISTORY_CAPACITY);
            }
            buffer.replace_all((0..round * 4).map(entry).collect());
            assert!(buffer.iter().count() <= HISTORY_CAPACITY);
        }
    }

    #[test]
    fn test_record_entry_uses_placeholders() {
        let record = HistoryRecord {
            timestamp: "2025-03-04T09:15:27.123456".to_string(),
            heart_rate: 88.0,
            blood_pressure_systolic: 135.0,
            blood_pressure_diastolic: 85.0,
            oxygen_saturation: 96.0,
            temperature: 37.1,
            risk_score: 2.0,
            risk_level: RiskLevel::Low,
            explanation: String::new(),
        };
        let entry = HistoryEntry::from_record(&record);

        assert_eq!(entry.time, "09:15:27");
        assert_eq!(entry.bp, 135.0);
        assert_eq!(entry.st, PLACEHOLDER_ST);
        assert_eq!(entry.t_wave, PLACEHOLDER_T_WAVE);
    }

    #[test]
    fn test_display_time_formats() {
        assert_eq!(display_time("2025-03-04T09:15:27+02:00"), "09:15:27");
        assert_eq!(display_time("2025-03-04T23:01:02"), "23:01:02");
        assert_eq!(display_time("yesterday"), "yesterday");
    }

    #[test]
    fn test_history_records_ignore_extra_fields() {
        let body = r#"[{"id": 7, "timestamp": "2025-03-04T09:15:27", "heart_rate": 72,
            "blood_pressure_systolic": 118, "blood_pressure_diastolic": 76,
            "oxygen_saturation": 99, "temperature": 36.8, "risk_score": 0,
            "risk_level": "LOW", "explanation": "Normal."}]"#;
        let records: Vec<HistoryRecord> = serde_json::from_str(body).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heart_rate, 72.0);
    }
}
