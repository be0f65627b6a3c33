//! Top-level configuration for the watcher.
//!
//! This module aggregates configuration for:
//!
//! - the chain RPC client (`RpcConfig`),
//! - the upstream metrics feeds merged at scrape time (`FeedsConfig`),
//! - the block tracker (`TrackerConfig`).
//!
//! The goal is a single `WatcherConfig` struct that higher-level binaries
//! can construct from defaults or from environment variables via
//! [`WatcherConfig::from_env`]. Nothing here is mutated after startup; in
//! particular the tracked validator set is fixed for the process lifetime.

use std::collections::BTreeMap;
use std::time::Duration;

/// Metric namespace prepended to every locally produced metric name.
///
/// Also the first entry of the default feed-deduplication prefix set, so
/// that chain-node feed lines never shadow locally produced families.
pub const METRIC_NAMESPACE: &str = "beaconwatch";

/// Configuration for the chain RPC client.
#[derive(Clone, Debug)]
pub struct RpcConfig {
    /// Base URL of the chain node RPC, e.g. `"http://127.0.0.1:26657"`.
    pub base_url: String,
    /// Request timeout for RPC calls.
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:26657".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Configuration for the upstream metrics feeds merged into `/all-metrics`.
#[derive(Clone, Debug)]
pub struct FeedsConfig {
    /// URL of the host-resource exporter feed, passed through verbatim.
    pub system_url: String,
    /// URL of the chain node's own metrics feed, line-filtered on merge.
    pub node_url: String,
    /// Request timeout for the system feed.
    pub system_timeout: Duration,
    /// Request timeout for the chain-node feed.
    pub node_timeout: Duration,
    /// Metric-family name prefixes excluded from the chain-node feed.
    ///
    /// Data lines whose family name starts with any of these prefixes are
    /// dropped during the merge, so the same family is never emitted by
    /// two sources. The set is configurable because no authoritative
    /// exclusion list exists upstream.
    pub dedup_prefixes: Vec<String>,
}

impl FeedsConfig {
    /// The prefix set used when `DEDUP_PREFIXES` is not supplied: the
    /// local namespace plus the common runtime-metric prefixes.
    pub fn default_dedup_prefixes() -> Vec<String> {
        vec![
            format!("{METRIC_NAMESPACE}_"),
            "go_".to_string(),
            "process_".to_string(),
        ]
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            system_url: "http://127.0.0.1:9100/metrics".to_string(),
            node_url: "http://127.0.0.1:26660/metrics".to_string(),
            system_timeout: Duration::from_secs(10),
            node_timeout: Duration::from_secs(15),
            dedup_prefixes: Self::default_dedup_prefixes(),
        }
    }
}

/// Configuration for the block tracker.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Tracked validators: consensus address -> human-readable label.
    ///
    /// A `BTreeMap` keeps iteration order stable, which keeps log output
    /// and test expectations deterministic.
    pub validators: BTreeMap<String, String>,
    /// Chain identifier used as a fixed label on the missed-blocks gauge.
    pub chain_id: String,
    /// Polling cadence. This is a poll interval, not a block subscription;
    /// the processed-height gate makes redundant polls harmless.
    pub poll_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            validators: BTreeMap::new(),
            chain_id: "beacon-devnet".to_string(),
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Top-level configuration for the watcher.
#[derive(Clone, Debug, Default)]
pub struct WatcherConfig {
    pub rpc: RpcConfig,
    pub feeds: FeedsConfig,
    pub tracker: TrackerConfig,
}

impl WatcherConfig {
    /// Builds a configuration from process environment variables, falling
    /// back to the defaults for anything unset:
    ///
    /// - `RPC_ENDPOINT` — chain RPC base URL,
    /// - `SYSTEM_METRICS_URL` — host-resource exporter feed,
    /// - `NODE_METRICS_URL` — chain-node metrics feed,
    /// - `TRACKED_VALIDATORS` — `address=label` pairs, comma-separated,
    /// - `CHAIN_ID` — fixed chain label,
    /// - `DEDUP_PREFIXES` — comma-separated family-name prefixes.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(url) = std::env::var("RPC_ENDPOINT") {
            cfg.rpc.base_url = url;
        }
        if let Ok(url) = std::env::var("SYSTEM_METRICS_URL") {
            cfg.feeds.system_url = url;
        }
        if let Ok(url) = std::env::var("NODE_METRICS_URL") {
            cfg.feeds.node_url = url;
        }
        if let Ok(spec) = std::env::var("TRACKED_VALIDATORS") {
            cfg.tracker.validators = parse_validator_spec(&spec);
        }
        if let Ok(chain_id) = std::env::var("CHAIN_ID") {
            cfg.tracker.chain_id = chain_id;
        }
        if let Ok(prefixes) = std::env::var("DEDUP_PREFIXES") {
            cfg.feeds.dedup_prefixes = parse_prefix_spec(&prefixes);
        }

        cfg
    }
}

/// Parses a `TRACKED_VALIDATORS` value of the form
/// `"ADDR1=label1,ADDR2=label2"` into an address -> label map.
///
/// Entries without a `=` and entries with an empty address or label are
/// skipped with a warning rather than rejecting the whole spec.
pub fn parse_validator_spec(spec: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.split_once('=') {
            Some((addr, label)) if !addr.trim().is_empty() && !label.trim().is_empty() => {
                out.insert(addr.trim().to_string(), label.trim().to_string());
            }
            _ => {
                tracing::warn!(entry, "ignoring malformed tracked-validator entry");
            }
        }
    }
    out
}

/// Parses a comma-separated prefix list, dropping empty entries.
fn parse_prefix_spec(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
