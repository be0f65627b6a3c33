// exporter/src/main.rs

//! Exporter binary.
//!
//! This binary exposes the validator metrics HTTP surface on top of the
//! `watcher` crate:
//!
//! - `GET /metrics` — local metric store only,
//! - `GET /all-metrics` — local store merged with the system and
//!   chain-node feeds,
//! - `GET /health` — fixed liveness check.
//!
//! It spawns the block tracker as a background task with a watch-channel
//! shutdown signal and serves until Ctrl-C.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::signal;
use tokio::sync::watch;

use watcher::{BlockTracker, FeedClient, HttpChainRpc, MetricsRegistry, WatcherConfig};

use config::ExporterConfig;
use routes::{health, metrics};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "exporter=info,watcher=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let exporter_cfg = ExporterConfig::from_env();
    let watcher_cfg = WatcherConfig::from_env();

    if watcher_cfg.tracker.validators.is_empty() {
        tracing::warn!(
            "TRACKED_VALIDATORS is empty; no per-validator signing metrics will be produced"
        );
    }
    tracing::info!(
        rpc = %watcher_cfg.rpc.base_url,
        chain_id = %watcher_cfg.tracker.chain_id,
        validators = watcher_cfg.tracker.validators.len(),
        "starting validator metrics exporter"
    );

    // ---------------------------
    // Metrics registry
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    // ---------------------------
    // Chain RPC client + tracker
    // ---------------------------

    let rpc = HttpChainRpc::new(&watcher_cfg.rpc)
        .map_err(|e| format!("failed to create chain RPC client: {e}"))?;

    let tracker = BlockTracker::new(watcher_cfg.tracker.clone(), rpc, metrics.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(tracker.run(shutdown_rx));

    // ---------------------------
    // Upstream feed client
    // ---------------------------

    let feeds = FeedClient::new(&watcher_cfg.feeds)
        .map_err(|e| format!("failed to create feed client: {e}"))?;

    // ---------------------------
    // Shared state + HTTP router
    // ---------------------------

    let app_state: SharedState = Arc::new(AppState {
        metrics: metrics.clone(),
        feeds,
    });

    let app = Router::new()
        .route("/metrics", get(metrics::local_metrics))
        .route("/all-metrics", get(metrics::all_metrics))
        .route("/health", get(health::health))
        .with_state(app_state);

    tracing::info!("exporter listening on http://{}", exporter_cfg.listen_addr);

    // Binding the listener is the only fatal failure in this process.
    let listener = tokio::net::TcpListener::bind(exporter_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", exporter_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("HTTP server error: {e}"))?;

    // Stop the polling loop; in-flight responses have already completed.
    let _ = shutdown_tx.send(true);

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
