//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use artiprobe_core::error::{ArtiprobeError, Result};

pub use schema::{ClusterMode, ClusterSection, ExporterConfig, ExporterSection, ProbeSection};

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "artiprobe.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<ExporterConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        ArtiprobeError::BadConfig(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| ArtiprobeError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` if it exists, otherwise fall back to the compiled-in defaults.
/// Returns whether the file was used.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<(ExporterConfig, bool)> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(_) => Ok((load_from_file(path)?, true)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let cfg = ExporterConfig::default();
            cfg.validate()?;
            Ok((cfg, false))
        }
        Err(e) => Err(ArtiprobeError::BadConfig(format!(
            "stat config {} failed: {e}",
            path.display()
        ))),
    }
}
