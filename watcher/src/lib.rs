//! Watcher library crate.
//!
//! This crate provides the core building blocks for a validator metrics
//! exporter targeting a beacon-style chain, where a block's signer set is
//! only observable from the following block's commit data:
//!
//! - top-level configuration loaded from the environment (`config`),
//! - a chain RPC client (`rpc`),
//! - Prometheus-based metrics (`metrics`),
//! - the polling block tracker and signing inference (`tracker`),
//! - request-time aggregation of upstream metrics feeds (`aggregate`).
//!
//! Higher-level binaries compose these pieces into an exporter process:
//! spawn [`BlockTracker::run`] in the background and serve the registry
//! (plain or merged with the upstream feeds) over HTTP.

pub mod aggregate;
pub mod config;
pub mod metrics;
pub mod rpc;
pub mod tracker;

// Re-export top-level configuration types.
pub use config::{FeedsConfig, RpcConfig, TrackerConfig, WatcherConfig};

// Re-export the RPC seam and its HTTP implementation.
pub use rpc::{ChainRpc, HttpChainRpc, RpcError};

// Re-export metrics registry and metric groups.
pub use metrics::{ChainMetrics, MempoolMetrics, MetricsRegistry, ValidatorMetrics};

// Re-export the tracker and its height cache.
pub use tracker::{BlockTracker, ProcessedHeights};

// Re-export aggregation entry points.
pub use aggregate::{FeedClient, FeedError, filter_node_metrics, render_merged};

/// Type alias for the default tracker stack used by a "typical" exporter.
///
/// This pairs [`BlockTracker`] with the reqwest-backed [`HttpChainRpc`].
pub type DefaultBlockTracker = BlockTracker<HttpChainRpc>;
