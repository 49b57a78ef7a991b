use std::net::SocketAddr;
use std::time::Duration;

use artiprobe_core::error::{ArtiprobeError, Result};
use artiprobe_core::ArtifactCatalog;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub probe: ProbeSection,

    #[serde(default)]
    pub cluster: ClusterSection,

    #[serde(default = "default_catalog")]
    pub catalog: ArtifactCatalog,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            probe: ProbeSection::default(),
            cluster: ClusterSection::default(),
            catalog: default_catalog(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ArtiprobeError::UnsupportedVersion);
        }

        self.exporter.validate()?;
        self.probe.validate()?;
        self.catalog.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.metrics_path.starts_with('/') || self.metrics_path.len() < 2 {
            return Err(ArtiprobeError::BadConfig(
                "exporter.metrics_path must start with '/' and name a path".into(),
            ));
        }
        if self.metrics_path == "/healthz" {
            return Err(ArtiprobeError::BadConfig(
                "exporter.metrics_path must not shadow /healthz".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ArtiprobeError::BadConfig(format!(
                "exporter.listen must be a valid SocketAddr ({:?}): {e}",
                self.listen
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 0 = one slot per target.
    #[serde(default)]
    pub max_concurrency: usize,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            max_concurrency: 0,
        }
    }
}

impl ProbeSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=86_400).contains(&self.interval_secs) {
            return Err(ArtiprobeError::BadConfig(
                "probe.interval_secs must be between 1 and 86400".into(),
            ));
        }
        if !(1..=3_600).contains(&self.timeout_secs) {
            return Err(ArtiprobeError::BadConfig(
                "probe.timeout_secs must be between 1 and 3600".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    Disabled,
    #[default]
    Optional,
    Required,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterSection {
    #[serde(default)]
    pub mode: ClusterMode,
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_interval_secs() -> u64 {
    300
}
fn default_timeout_secs() -> u64 {
    120
}

/// Compiled-in catalog. Only sources with real URLs are listed; add other
/// sources through the config file.
pub fn default_catalog() -> ArtifactCatalog {
    ArtifactCatalog::new()
        .with(
            "weights",
            "azure",
            "https://sharkpublic.blob.core.windows.net/sharkpublic/sdxl/v1/model.safetensors",
        )
        .with(
            "mlir",
            "azure",
            "https://sharkpublic.blob.core.windows.net/sharkpublic/sdxl/v1/mlir_model.mlir",
        )
}
