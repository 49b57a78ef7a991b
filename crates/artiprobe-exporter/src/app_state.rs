//! Shared application state for the metrics server.

use std::sync::Arc;

use crate::obs::ProbeMetrics;

#[derive(Clone)]
pub struct AppState {
    metrics: Arc<ProbeMetrics>,
}

impl AppState {
    /// The registry is owned by the caller and shared with the probe runner.
    pub fn new(metrics: Arc<ProbeMetrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &ProbeMetrics {
        &self.metrics
    }
}
