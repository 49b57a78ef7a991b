//! Lightweight in-process metrics.
//!
//! Prometheus-compatible text exposition without a client library. Values
//! live in `DashMap`s and are rendered by the `/metrics` handler.

pub mod metrics;

pub use metrics::{MetricSample, ProbeMetrics};
