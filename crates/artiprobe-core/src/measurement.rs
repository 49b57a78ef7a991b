//! Turning a finished transfer into a probe measurement.

use std::time::Duration;

use crate::catalog::ProbeTarget;
use crate::error::{ArtiprobeError, Result};

/// Bytes per megabyte (binary, 1024 * 1024).
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Anything shorter cannot be told apart from a clock hiccup.
pub const MIN_MEASURABLE_DURATION: Duration = Duration::from_micros(1);

/// One successful download, ready to be recorded.
///
/// All numeric fields are finite and non-negative; `from_transfer` is the
/// only constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub source: String,
    pub artifact_type: String,
    pub duration_seconds: f64,
    pub size_megabytes: f64,
    pub speed_mbps: f64,
}

impl ProbeResult {
    /// Derive size and speed from the received byte count and elapsed time.
    pub fn from_transfer(target: &ProbeTarget, bytes: u64, elapsed: Duration) -> Result<Self> {
        if elapsed < MIN_MEASURABLE_DURATION {
            return Err(ArtiprobeError::DegenerateTiming(elapsed));
        }
        let duration_seconds = elapsed.as_secs_f64();
        let size_megabytes = bytes as f64 / BYTES_PER_MB;
        let speed_mbps = size_megabytes / duration_seconds;
        if !speed_mbps.is_finite() {
            return Err(ArtiprobeError::DegenerateTiming(elapsed));
        }

        Ok(Self {
            source: target.source.clone(),
            artifact_type: target.artifact_type.clone(),
            duration_seconds,
            size_megabytes,
            speed_mbps,
        })
    }
}
