//! Metrics endpoints.
//!
//! - `GET /metrics` serves the local metric store only.
//! - `GET /all-metrics` serves the merged response: local store, system
//!   feed verbatim, chain-node feed line-filtered. Both upstream fetches
//!   happen synchronously within the request; a failed fetch degrades
//!   its section to a comment instead of failing the scrape.

use axum::extract::State;
use axum::http::header;

use watcher::aggregate::{EXPOSITION_CONTENT_TYPE, render_merged};

use crate::state::SharedState;

type TextResponse = ([(header::HeaderName, &'static str); 1], String);

fn exposition(body: String) -> TextResponse {
    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body)
}

/// `GET /metrics`
///
/// Local metric store in the Prometheus text exposition format.
pub async fn local_metrics(State(state): State<SharedState>) -> TextResponse {
    exposition(state.metrics.gather_text())
}

/// `GET /all-metrics`
///
/// Merged response built from the local store and the two upstream
/// feeds. Always `200 OK`; unavailable sections carry a comment marker.
pub async fn all_metrics(State(state): State<SharedState>) -> TextResponse {
    let local = state.metrics.gather_text();
    let system = state.feeds.fetch_system().await;
    let node = state.feeds.fetch_node().await;

    exposition(render_merged(
        &local,
        system,
        node,
        state.feeds.dedup_prefixes(),
    ))
}
