//! Artifact download seam.
//!
//! The runner only needs "GET this URL and hand me the whole body". Keeping
//! that behind a trait lets tests drive the runner with scripted fetchers and
//! paused time instead of real sockets.

use async_trait::async_trait;
use bytes::Bytes;

use artiprobe_core::error::{ArtiprobeError, Result};

#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download `url` completely into memory.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// reqwest-backed fetcher. Default redirect policy, no auth headers.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("artiprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArtiprobeError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArtiprobeError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ArtiprobeError::HttpStatus(status.as_u16()));
        }

        resp.bytes()
            .await
            .map_err(|e| ArtiprobeError::Transport(format!("body read failed: {e}")))
    }
}
