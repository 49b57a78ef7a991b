//! Probe loop: fan out one download per catalog entry, record, sleep, repeat.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio::sync::watch;
use tokio::time::{timeout, Duration, Instant};

use artiprobe_core::error::{ArtiprobeError, Result};
use artiprobe_core::{ArtifactCatalog, ProbeResult, ProbeTarget};

use crate::config::ProbeSection;
use crate::obs::ProbeMetrics;
use crate::shutdown::stop_requested;

use super::fetch::ArtifactFetcher;

/// Outcome counts of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct ProbeRunner {
    catalog: ArtifactCatalog,
    fetcher: Arc<dyn ArtifactFetcher>,
    metrics: Arc<ProbeMetrics>,
    interval: Duration,
    timeout: Duration,
    max_concurrency: usize,
}

impl ProbeRunner {
    pub fn new(
        cfg: &ProbeSection,
        catalog: ArtifactCatalog,
        fetcher: Arc<dyn ArtifactFetcher>,
        metrics: Arc<ProbeMetrics>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            metrics,
            interval: cfg.interval(),
            timeout: cfg.timeout(),
            max_concurrency: cfg.max_concurrency,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Download one target and turn it into a measurement.
    /// The clock covers request, response headers and the full body.
    pub async fn probe_one(&self, target: &ProbeTarget) -> Result<ProbeResult> {
        let start = Instant::now();
        let body = timeout(self.timeout, self.fetcher.fetch(&target.url))
            .await
            .map_err(|_| ArtiprobeError::Timeout(self.timeout))??;
        ProbeResult::from_transfer(target, body.len() as u64, start.elapsed())
    }

    /// Run every target once, recording successes and counting failures.
    /// Returns after all targets have finished one way or the other.
    pub async fn run_cycle(&self) -> CycleReport {
        let targets = self.catalog.targets();
        let slots = match self.max_concurrency {
            0 => targets.len().max(1),
            n => n,
        };

        let outcomes: Vec<bool> = stream::iter(targets)
            .map(|target| async move {
                match self.probe_one(&target).await {
                    Ok(result) => {
                        tracing::debug!(
                            source = %result.source,
                            artifact_type = %result.artifact_type,
                            duration_s = result.duration_seconds,
                            size_mb = result.size_megabytes,
                            speed_mbps = result.speed_mbps,
                            "probe ok"
                        );
                        self.metrics.record_result(&result);
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            source = %target.source,
                            artifact_type = %target.artifact_type,
                            url = %target.url,
                            error = %e,
                            "probe failed; observation dropped"
                        );
                        self.metrics.record_failure(
                            &target.source,
                            &target.artifact_type,
                            e.kind().as_str(),
                        );
                        false
                    }
                }
            })
            .buffer_unordered(slots)
            .collect()
            .await;

        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        CycleReport {
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }

    /// Cycle until `shutdown` flips to `true`.
    ///
    /// The signal is checked at cycle start, after the fan-out, and raced
    /// against the idle sleep. In-flight downloads are never cut short by it.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            targets = self.catalog.len(),
            interval_s = self.interval.as_secs(),
            timeout_s = self.timeout.as_secs(),
            "probe loop starting"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_cycle().await;
            tracing::info!(
                attempted = report.attempted,
                succeeded = report.succeeded,
                failed = report.failed,
                "probe cycle finished"
            );

            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = stop_requested(&mut shutdown) => break,
            }
        }

        tracing::info!("probe loop stopped");
    }
}
