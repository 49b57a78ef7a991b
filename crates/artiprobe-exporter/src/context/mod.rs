//! Execution-environment context.
//!
//! Detects the cluster the exporter runs in. Nothing downstream depends on
//! it; it is reported once at startup.

pub mod cluster;

pub use cluster::ClusterIdentity;
