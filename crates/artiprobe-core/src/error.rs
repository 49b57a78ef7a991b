//! Shared error type across artiprobe crates.

use std::time::Duration;

use thiserror::Error;

/// Stable error classes. `as_str` doubles as the `reason` label on the
/// failure counter, so the set is closed and the strings must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Configuration failed to parse or validate.
    BadConfig,
    /// Unsupported config schema version.
    UnsupportedVersion,
    /// Connection, DNS or body read failure.
    Transport,
    /// Source answered with a non-success HTTP status.
    HttpStatus,
    /// Download exceeded the per-download timeout.
    Timeout,
    /// Measured duration too small to derive a speed from.
    DegenerateTiming,
    /// Cluster credential bootstrap failed.
    Cluster,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BadConfig => "bad_config",
            ErrorKind::UnsupportedVersion => "unsupported_version",
            ErrorKind::Transport => "transport",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Timeout => "timeout",
            ErrorKind::DegenerateTiming => "degenerate_timing",
            ErrorKind::Cluster => "cluster",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ArtiprobeError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum ArtiprobeError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("transport: {0}")]
    Transport(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("download timed out after {0:?}")]
    Timeout(Duration),
    #[error("degenerate timing: {0:?} is below the measurable minimum")]
    DegenerateTiming(Duration),
    #[error("cluster: {0}")]
    Cluster(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ArtiprobeError {
    /// Map the error to its stable class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArtiprobeError::BadConfig(_) => ErrorKind::BadConfig,
            ArtiprobeError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            ArtiprobeError::Transport(_) => ErrorKind::Transport,
            ArtiprobeError::HttpStatus(_) => ErrorKind::HttpStatus,
            ArtiprobeError::Timeout(_) => ErrorKind::Timeout,
            ArtiprobeError::DegenerateTiming(_) => ErrorKind::DegenerateTiming,
            ArtiprobeError::Cluster(_) => ErrorKind::Cluster,
            ArtiprobeError::Internal(_) => ErrorKind::Internal,
        }
    }
}
