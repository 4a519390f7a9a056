// Waveform domain model - synthetic single-beat ECG trace
use crate::domain::vitals::VitalsSnapshot;
use serde::Serialize;
use std::f64::consts::PI;

pub const WAVEFORM_POINTS: usize = 100;
const BASELINE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveformPoint {
    pub x: u32,
    pub y: f64,
}

/// The four snapshot fields that shape the trace.
///
/// PR and QT intervals are shown on the dashboard but do not move any region
/// boundary; every region has a fixed width.
#[derive(Debug, Clone, Copy)]
struct BeatShape {
    p_wave_duration: f64,
    qrs_duration: f64,
    t_wave_amplitude: f64,
    st_segment_elevation: f64,
}

impl BeatShape {
    fn from_vitals(vitals: &VitalsSnapshot) -> Self {
        Self {
            p_wave_duration: vitals.p_wave_duration,
            qrs_duration: vitals.qrs_duration,
            t_wave_amplitude: vitals.t_wave_amplitude,
            st_segment_elevation: vitals.st_segment_elevation,
        }
    }

    // Bit patterns, so a NaN input still compares equal to itself.
    fn key(&self) -> [u64; 4] {
        [
            self.p_wave_duration.to_bits(),
            self.qrs_duration.to_bits(),
            self.t_wave_amplitude.to_bits(),
            self.st_segment_elevation.to_bits(),
        ]
    }

    fn sample(&self, x: u32) -> f64 {
        match x {
            // P wave
            10..=20 => {
                BASELINE - self.p_wave_duration * 50.0 * (f64::from(x - 10) * PI / 10.0).sin()
            }
            // QRS complex
            30..=34 => BASELINE + 10.0,
            35..=37 => BASELINE - self.qrs_duration * 200.0,
            38..=40 => BASELINE + 5.0,
            // ST segment
            41..=54 => BASELINE + self.st_segment_elevation * 100.0,
            // T wave
            55..=75 => {
                BASELINE - self.t_wave_amplitude * 80.0 * (f64::from(x - 55) * PI / 20.0).sin()
            }
            _ => BASELINE,
        }
    }

    fn render(&self) -> Vec<WaveformPoint> {
        (0..WAVEFORM_POINTS as u32)
            .map(|x| WaveformPoint { x, y: self.sample(x) })
            .collect()
    }
}

/// Build the full 100-point trace for a snapshot.
pub fn synthesize(vitals: &VitalsSnapshot) -> Vec<WaveformPoint> {
    BeatShape::from_vitals(vitals).render()
}

/// Synthesizer that reuses the last trace while the driving fields are unchanged.
#[derive(Debug, Default)]
pub struct WaveformSynthesizer {
    cached: Option<([u64; 4], Vec<WaveformPoint>)>,
}

impl WaveformSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&mut self, vitals: &VitalsSnapshot) -> &[WaveformPoint] {
        let shape = BeatShape::from_vitals(vitals);
        let key = shape.key();

        let stale = !matches!(&self.cached, Some((cached_key, _)) if *cached_key == key);
        if stale {
            self.cached = Some((key, shape.render()));
        }

        match &self.cached {
            Some((_, points)) => points,
            None => &[],
        }
    }
}
