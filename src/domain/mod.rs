// Domain layer - dashboard data model and pure signal synthesis
pub mod analysis;
pub mod history;
pub mod vitals;
pub mod waveform;
