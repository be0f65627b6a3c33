//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use watcher::{FeedClient, MetricsRegistry};

/// State held by the HTTP surface.
///
/// The metric registry is the read side of the single-writer store owned
/// by the tracker task; handlers only take serialization snapshots of it.
/// This is wrapped in an [`Arc`] and passed to handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Metrics registry shared with the block tracker (read-only here).
    pub metrics: Arc<MetricsRegistry>,
    /// Client for the two upstream feeds merged into `/all-metrics`.
    pub feeds: FeedClient,
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
