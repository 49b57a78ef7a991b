//! Artifact catalog: artifact-type -> source -> URL.
//!
//! The catalog is built once (from config or the compiled-in defaults) and
//! never mutated afterwards. Ordered maps keep target order, and therefore
//! log and render order, deterministic.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use crate::error::{ArtiprobeError, Result};

/// One probe target, flattened out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub artifact_type: String,
    pub source: String,
    pub url: String,
}

/// Two-level mapping of artifact-type -> source -> download URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ArtifactCatalog {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl ArtifactCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used for the compiled-in defaults and tests.
    pub fn with(mut self, artifact_type: &str, source: &str, url: &str) -> Self {
        self.entries
            .entry(artifact_type.to_string())
            .or_default()
            .insert(source.to_string(), url.to_string());
        self
    }

    /// Number of (artifact_type, source) pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn url(&self, artifact_type: &str, source: &str) -> Option<&str> {
        self.entries
            .get(artifact_type)
            .and_then(|sources| sources.get(source))
            .map(String::as_str)
    }

    pub fn contains(&self, artifact_type: &str, source: &str) -> bool {
        self.url(artifact_type, source).is_some()
    }

    /// Flatten into (artifact_type, source, url) triples.
    pub fn targets(&self) -> Vec<ProbeTarget> {
        self.entries
            .iter()
            .flat_map(|(artifact_type, sources)| {
                sources.iter().map(move |(source, url)| ProbeTarget {
                    artifact_type: artifact_type.clone(),
                    source: source.clone(),
                    url: url.clone(),
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ArtiprobeError::BadConfig("catalog must not be empty".into()));
        }
        for (artifact_type, sources) in &self.entries {
            validate_ident("artifact type", artifact_type)?;
            for (source, url) in sources {
                validate_ident("source", source)?;
                validate_url(url).map_err(|why| {
                    ArtiprobeError::BadConfig(format!(
                        "catalog.{artifact_type}.{source}: {why}: {url:?}"
                    ))
                })?;
            }
        }
        Ok(())
    }
}

// Identifiers end up as label values; keep them boring.
fn validate_ident(what: &str, s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(ArtiprobeError::BadConfig(format!("{what} must not be empty")));
    }
    let ok = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !ok {
        return Err(ArtiprobeError::BadConfig(format!(
            "{what} {s:?} may only contain [A-Za-z0-9_.-]"
        )));
    }
    Ok(())
}

/// Same parser the HTTP client uses, so anything accepted here is fetchable.
fn validate_url(raw: &str) -> std::result::Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid url ({e})"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("url must be absolute http(s)".into());
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("url has no valid host".into());
    }
    Ok(())
}
