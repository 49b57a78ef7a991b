//! artiprobe core: the artifact catalog, probe measurements, and the error
//! surface shared by the exporter.
//!
//! This crate carries no runtime, HTTP or metrics dependencies. It only knows
//! what gets probed and how a finished transfer turns into numbers.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Measurements that would carry NaN or infinity surface as
//! `ArtiprobeError::DegenerateTiming` instead of reaching the registry.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod catalog;
pub mod error;
pub mod measurement;

/// Shared result type.
pub use error::{ArtiprobeError, ErrorKind, Result};

pub use catalog::{ArtifactCatalog, ProbeTarget};
pub use measurement::ProbeResult;
