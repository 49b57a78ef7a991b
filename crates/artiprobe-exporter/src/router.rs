//! Axum router wiring and the metrics server task.

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;

use artiprobe_core::error::{ArtiprobeError, Result};

use crate::{app_state::AppState, ops, shutdown};

pub fn build_router(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route(metrics_path, get(ops::metrics))
        .with_state(state)
}

/// Serve until `stop` flips to `true`, then drain in-flight scrapes.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    mut stop: watch::Receiver<bool>,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown::stop_requested(&mut stop).await })
        .await
        .map_err(|e| ArtiprobeError::Internal(format!("metrics server failed: {e}")))
}
