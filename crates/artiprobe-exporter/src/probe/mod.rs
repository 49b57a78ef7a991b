//! Probe runner and its download seam.

pub mod fetch;
pub mod runner;

pub use fetch::{ArtifactFetcher, HttpFetcher};
pub use runner::{CycleReport, ProbeRunner};
