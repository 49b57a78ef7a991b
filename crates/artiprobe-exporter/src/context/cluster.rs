use std::fmt;
use std::fs;
use std::path::Path;

use artiprobe_core::error::{ArtiprobeError, Result};

use crate::config::ClusterMode;

/// Well-known service-account mount inside a pod.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Identity of the pod we run in. The probe loop never reads it; it only
/// tells operators at startup whether the process sees cluster credentials.
#[derive(Clone)]
pub struct ClusterIdentity {
    pub api_host: String,
    pub api_port: String,
    pub namespace: Option<String>,
    token: String,
}

// Keep the token out of logs.
impl fmt::Debug for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterIdentity")
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("namespace", &self.namespace)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ClusterIdentity {
    /// Detect in-cluster credentials from the process environment and the
    /// standard service-account mount.
    pub fn load_in_cluster() -> Result<Self> {
        Self::load_from(|k| std::env::var(k).ok(), Path::new(SERVICE_ACCOUNT_DIR))
    }

    /// Same as `load_in_cluster` with the env lookup and mount injected.
    pub fn load_from<F>(env: F, sa_dir: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| {
            env(k)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ArtiprobeError::Cluster(format!("{k} is not set")))
        };
        let api_host = var("KUBERNETES_SERVICE_HOST")?;
        let api_port = var("KUBERNETES_SERVICE_PORT")?;

        let token_path = sa_dir.join("token");
        let token = read_trimmed(&token_path)?;
        if token.is_empty() {
            return Err(ArtiprobeError::Cluster(format!(
                "{} is empty",
                token_path.display()
            )));
        }

        let namespace = read_trimmed(&sa_dir.join("namespace"))
            .ok()
            .filter(|ns| !ns.is_empty());

        Ok(Self {
            api_host,
            api_port,
            namespace,
            token,
        })
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

fn read_trimmed(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| ArtiprobeError::Cluster(format!("read {} failed: {e}", path.display())))
}

/// Run the bootstrap step according to `mode`.
///
/// `Optional` swallows the failure after logging it; `Required` returns it.
pub fn bootstrap(
    mode: ClusterMode,
    load: impl FnOnce() -> Result<ClusterIdentity>,
) -> Result<Option<ClusterIdentity>> {
    if mode == ClusterMode::Disabled {
        tracing::debug!("cluster credential bootstrap disabled");
        return Ok(None);
    }

    match load() {
        Ok(id) => {
            tracing::info!(
                api_host = %id.api_host,
                api_port = %id.api_port,
                namespace = id.namespace.as_deref().unwrap_or("-"),
                "in-cluster credentials loaded"
            );
            Ok(Some(id))
        }
        Err(e) if mode == ClusterMode::Optional => {
            tracing::warn!(error = %e, "no in-cluster credentials; continuing without them");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
