//! artiprobe exporter library entry.
//!
//! Wires the metrics registry, the probe runner and the scrape endpoint into
//! one process. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod obs;
pub mod ops;
pub mod probe;
pub mod router;
pub mod shutdown;
