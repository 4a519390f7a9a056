// Application layer - use cases over the dashboard state
pub mod analysis_controller;
pub mod cardio_gateway;
pub mod dashboard_store;
pub mod live_sync;
