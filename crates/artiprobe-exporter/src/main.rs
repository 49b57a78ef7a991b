//! artiprobe exporter
//!
//! - Scrape endpoint: GET /metrics (default 0.0.0.0:8000)
//! - Probe loop: download every catalog entry, record, sleep, repeat
//! - Graceful shutdown on Ctrl+C / SIGTERM

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artiprobe_core::{ArtiprobeError, Result};
use artiprobe_exporter::{
    app_state::AppState,
    config,
    context::{cluster, ClusterIdentity},
    obs::ProbeMetrics,
    probe::{HttpFetcher, ProbeRunner},
    router, shutdown,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind().as_str(), "artiprobe-exporter failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let (cfg, from_file) = config::load_or_default(config::DEFAULT_CONFIG_FILE)?;
    if from_file {
        tracing::info!(path = config::DEFAULT_CONFIG_FILE, "config loaded");
    } else {
        tracing::info!("no config file; using built-in defaults");
    }

    let _identity = cluster::bootstrap(cfg.cluster.mode, ClusterIdentity::load_in_cluster)?;

    let metrics = Arc::new(ProbeMetrics::new());
    let (stop_tx, stop_rx) = shutdown::channel();

    let listen = cfg.exporter.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ArtiprobeError::Internal(format!("bind {listen} failed: {e}")))?;
    let app = router::build_router(AppState::new(Arc::clone(&metrics)), &cfg.exporter.metrics_path);
    tracing::info!(%listen, path = %cfg.exporter.metrics_path, "metrics server starting");
    let mut server = tokio::spawn(router::serve(listener, app, stop_rx.clone()));

    tokio::spawn(async move {
        shutdown::os_signal().await;
        let _ = stop_tx.send(true);
    });

    let runner = ProbeRunner::new(
        &cfg.probe,
        cfg.catalog.clone(),
        Arc::new(HttpFetcher::new()?),
        metrics,
    );

    // A dead server ends the process; a finished probe loop waits for the
    // server to drain.
    tokio::select! {
        _ = runner.run(stop_rx) => {}
        res = &mut server => return server_outcome(res),
    }
    server_outcome(server.await)
}

fn server_outcome(res: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    res.map_err(|e| ArtiprobeError::Internal(format!("metrics server task: {e}")))?
}
