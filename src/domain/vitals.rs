// Vitals domain model - the values the clinician edits or live mode overwrites
use crate::domain::history::HistoryRecord;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Current set of vital-sign and ECG interval values.
///
/// Nothing here is range-checked. Integer-valued vitals are kept as `f64` so
/// that unparsable input (NaN) flows through to synthesis and outbound
/// requests unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VitalsSnapshot {
    #[serde(serialize_with = "whole_number")]
    pub heart_rate: f64,
    #[serde(serialize_with = "whole_number")]
    pub blood_pressure_systolic: f64,
    #[serde(serialize_with = "whole_number")]
    pub blood_pressure_diastolic: f64,
    #[serde(serialize_with = "whole_number")]
    pub oxygen_saturation: f64,
    pub temperature: f64,
    pub p_wave_duration: f64,
    pub pr_interval: f64,
    pub qrs_duration: f64,
    pub qt_interval: f64,
    pub t_wave_amplitude: f64,
    pub st_segment_elevation: f64,
}

impl Default for VitalsSnapshot {
    fn default() -> Self {
        Self {
            heart_rate: 75.0,
            blood_pressure_systolic: 120.0,
            blood_pressure_diastolic: 80.0,
            oxygen_saturation: 98.0,
            temperature: 37.0,
            p_wave_duration: 0.08,
            pr_interval: 0.16,
            qrs_duration: 0.09,
            qt_interval: 0.40,
            t_wave_amplitude: 0.3,
            st_segment_elevation: 0.0,
        }
    }
}

impl VitalsSnapshot {
    pub fn set(&mut self, field: VitalField, value: f64) {
        let slot = match field {
            VitalField::HeartRate => &mut self.heart_rate,
            VitalField::BloodPressureSystolic => &mut self.blood_pressure_systolic,
            VitalField::BloodPressureDiastolic => &mut self.blood_pressure_diastolic,
            VitalField::OxygenSaturation => &mut self.oxygen_saturation,
            VitalField::Temperature => &mut self.temperature,
            VitalField::PWaveDuration => &mut self.p_wave_duration,
            VitalField::PrInterval => &mut self.pr_interval,
            VitalField::QrsDuration => &mut self.qrs_duration,
            VitalField::QtInterval => &mut self.qt_interval,
            VitalField::TWaveAmplitude => &mut self.t_wave_amplitude,
            VitalField::StSegmentElevation => &mut self.st_segment_elevation,
        };
        *slot = value;
    }

    /// Overwrite the base vitals from a server reading and derive the ECG
    /// fields from its risk score.
    pub fn apply_live_reading(&mut self, record: &HistoryRecord) {
        self.heart_rate = record.heart_rate;
        self.blood_pressure_systolic = record.blood_pressure_systolic;
        self.blood_pressure_diastolic = record.blood_pressure_diastolic;
        self.oxygen_saturation = record.oxygen_saturation;
        self.temperature = record.temperature;

        let ecg = EcgEstimate::from_risk_score(record.risk_score);
        self.p_wave_duration = ecg.p_wave_duration;
        self.pr_interval = ecg.pr_interval;
        self.qrs_duration = ecg.qrs_duration;
        self.qt_interval = ecg.qt_interval;
        self.t_wave_amplitude = ecg.t_wave_amplitude;
        self.st_segment_elevation = ecg.st_segment_elevation;
    }

    pub fn preset(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Normal => Self::default(),
            Scenario::Moderate => Self {
                heart_rate: 115.0,
                blood_pressure_systolic: 155.0,
                blood_pressure_diastolic: 95.0,
                oxygen_saturation: 93.0,
                temperature: 37.8,
                p_wave_duration: 0.11,
                pr_interval: 0.19,
                qrs_duration: 0.10,
                qt_interval: 0.46,
                t_wave_amplitude: 0.15,
                st_segment_elevation: -0.08,
            },
            Scenario::Critical => Self {
                heart_rate: 160.0,
                blood_pressure_systolic: 195.0,
                blood_pressure_diastolic: 128.0,
                oxygen_saturation: 83.0,
                temperature: 38.5,
                p_wave_duration: 0.14,
                pr_interval: 0.24,
                qrs_duration: 0.14,
                qt_interval: 0.55,
                t_wave_amplitude: -0.20,
                st_segment_elevation: 0.25,
            },
        }
    }
}

/// ECG fields estimated from a risk score while polling.
///
/// These are display heuristics with no clinical grounding: fixed linear
/// offsets from textbook baselines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcgEstimate {
    pub p_wave_duration: f64,
    pub pr_interval: f64,
    pub qrs_duration: f64,
    pub qt_interval: f64,
    pub t_wave_amplitude: f64,
    pub st_segment_elevation: f64,
}

impl EcgEstimate {
    pub fn from_risk_score(risk_score: f64) -> Self {
        Self {
            p_wave_duration: 0.08 + risk_score * 0.01,
            pr_interval: 0.16 + risk_score * 0.005,
            qrs_duration: 0.09 + risk_score * 0.005,
            qt_interval: 0.40 + risk_score * 0.01,
            t_wave_amplitude: 0.3 - risk_score * 0.02,
            st_segment_elevation: if risk_score > 10.0 { 0.15 } else { 0.0 },
        }
    }
}

/// One editable field of [`VitalsSnapshot`], named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VitalField {
    HeartRate,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    OxygenSaturation,
    Temperature,
    PWaveDuration,
    PrInterval,
    QrsDuration,
    QtInterval,
    TWaveAmplitude,
    StSegmentElevation,
}

impl VitalField {
    pub const ALL: [VitalField; 11] = [
        VitalField::HeartRate,
        VitalField::BloodPressureSystolic,
        VitalField::BloodPressureDiastolic,
        VitalField::OxygenSaturation,
        VitalField::Temperature,
        VitalField::PWaveDuration,
        VitalField::PrInterval,
        VitalField::QrsDuration,
        VitalField::QtInterval,
        VitalField::TWaveAmplitude,
        VitalField::StSegmentElevation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VitalField::HeartRate => "heart_rate",
            VitalField::BloodPressureSystolic => "blood_pressure_systolic",
            VitalField::BloodPressureDiastolic => "blood_pressure_diastolic",
            VitalField::OxygenSaturation => "oxygen_saturation",
            VitalField::Temperature => "temperature",
            VitalField::PWaveDuration => "p_wave_duration",
            VitalField::PrInterval => "pr_interval",
            VitalField::QrsDuration => "qrs_duration",
            VitalField::QtInterval => "qt_interval",
            VitalField::TWaveAmplitude => "t_wave_amplitude",
            VitalField::StSegmentElevation => "st_segment_elevation",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            VitalField::HeartRate
                | VitalField::BloodPressureSystolic
                | VitalField::BloodPressureDiastolic
                | VitalField::OxygenSaturation
        )
    }

    /// Parse raw form text the way a number input does: anything that is not
    /// a number becomes NaN, integer fields drop the fractional part.
    pub fn parse_input(self, raw: &str) -> f64 {
        let value = raw.trim().parse::<f64>().unwrap_or(f64::NAN);
        if self.is_integer() { value.trunc() } else { value }
    }
}

impl fmt::Display for VitalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VitalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VitalField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown vital field: {}", s))
    }
}

/// Canned snapshots matching the simulator scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Normal,
    Moderate,
    Critical,
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Scenario::Normal),
            "moderate" => Ok(Scenario::Moderate),
            "critical" => Ok(Scenario::Critical),
            other => Err(format!("unknown scenario: {}", other)),
        }
    }
}

// Whole numbers go out as JSON integers so integer-typed endpoints accept them.
fn whole_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
