//! Metrics and instrumentation for the watcher.
//!
//! This module defines the Prometheus-backed metric store written by the
//! block tracker and serialized on each scrape.
//!
//! Typical usage in an exporter binary:
//!
//! ```ignore
//! use std::sync::Arc;
//! use watcher::metrics::MetricsRegistry;
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//!
//! // Write path (block tracker only):
//! registry.chain.block_height.set(height as i64);
//!
//! // Read path (HTTP handlers):
//! let body = registry.gather_text();
//! ```

pub mod prometheus;

pub use self::prometheus::{ChainMetrics, MempoolMetrics, MetricsRegistry, ValidatorMetrics};
