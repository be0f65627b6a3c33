//! Prometheus-backed metric store.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and the strongly-typed metric groups the block tracker
//! writes into: chain progress, per-validator signing state, and
//! mempool occupancy.
//!
//! The write path is restricted to the single tracker task; HTTP
//! handlers only call [`MetricsRegistry::gather_text`]. Each individual
//! point update is atomic inside the `prometheus` crate, so concurrent
//! read-during-write needs no extra locking. No cross-metric consistency
//! is promised: a scrape landing mid-update may see half of a tick's
//! writes, which is fine because each point is an independent fact.

use prometheus::{
    self, Encoder, Gauge, GaugeVec, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

use crate::config::METRIC_NAMESPACE;

/// Chain progress metrics.
#[derive(Clone)]
pub struct ChainMetrics {
    /// Latest known block height.
    pub block_height: IntGauge,
    /// Number of blocks fully processed since start.
    pub tracked_blocks: IntCounter,
    /// Number of polls that observed an already-processed or stale height.
    pub skipped_blocks: IntCounter,
}

impl ChainMetrics {
    /// Registers chain metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let block_height = IntGauge::with_opts(Opts::new(
            "validator_block_height",
            "Latest known block height",
        ))?;
        registry.register(Box::new(block_height.clone()))?;

        let tracked_blocks = IntCounter::with_opts(Opts::new(
            "validator_tracked_blocks",
            "Number of blocks tracked since start",
        ))?;
        registry.register(Box::new(tracked_blocks.clone()))?;

        let skipped_blocks = IntCounter::with_opts(Opts::new(
            "validator_skipped_blocks",
            "Number of polls skipped because the height was stale or already processed",
        ))?;
        registry.register(Box::new(skipped_blocks.clone()))?;

        Ok(Self {
            block_height,
            tracked_blocks,
            skipped_blocks,
        })
    }
}

/// Per-validator metrics derived from signing inference and the
/// validator-set / staking endpoints.
#[derive(Clone)]
pub struct ValidatorMetrics {
    /// Signing status per validator and height (1=signed, 0=missed),
    /// derived from the previous block's commit.
    pub signed_block: GaugeVec,
    /// Missed flag per validator under a fixed chain label; complement of
    /// `signed_block` for the most recently processed height.
    pub missed_blocks: GaugeVec,
    /// Active-set membership per validator (1=active, 0=inactive).
    pub status: GaugeVec,
    /// Number of validators in the active set.
    pub active_set: IntGauge,
    /// Set to 1 if the validator is bonded.
    pub is_bonded: GaugeVec,
    /// Set to 1 if the validator is jailed.
    pub is_jailed: GaugeVec,
    /// Number of staked tokens per validator.
    pub tokens: GaugeVec,
    /// Commission rate per validator.
    pub commission: GaugeVec,
}

impl ValidatorMetrics {
    /// Registers validator metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let signed_block = GaugeVec::new(
            Opts::new(
                "validator_beacon_block_signed",
                "Block signing status per validator (1=signed, 0=missed), derived from the previous block's commit",
            ),
            &["validator", "block_height"],
        )?;
        registry.register(Box::new(signed_block.clone()))?;

        let missed_blocks = GaugeVec::new(
            Opts::new(
                "consensus_validator_missed_blocks",
                "Set to 1 if the validator missed the most recently processed block",
            ),
            &["validator", "chain_id"],
        )?;
        registry.register(Box::new(missed_blocks.clone()))?;

        let status = GaugeVec::new(
            Opts::new(
                "validator_status",
                "Validator active-set membership (1=active, 0=inactive)",
            ),
            &["validator", "address"],
        )?;
        registry.register(Box::new(status.clone()))?;

        let active_set = IntGauge::with_opts(Opts::new(
            "validator_active_set",
            "Number of validators in the active set",
        ))?;
        registry.register(Box::new(active_set.clone()))?;

        let is_bonded = GaugeVec::new(
            Opts::new("validator_is_bonded", "Set to 1 if the validator is bonded"),
            &["validator"],
        )?;
        registry.register(Box::new(is_bonded.clone()))?;

        let is_jailed = GaugeVec::new(
            Opts::new("validator_is_jailed", "Set to 1 if the validator is jailed"),
            &["validator"],
        )?;
        registry.register(Box::new(is_jailed.clone()))?;

        let tokens = GaugeVec::new(
            Opts::new("validator_tokens", "Number of staked tokens per validator"),
            &["validator"],
        )?;
        registry.register(Box::new(tokens.clone()))?;

        let commission = GaugeVec::new(
            Opts::new("validator_commission", "Validator commission rate"),
            &["validator"],
        )?;
        registry.register(Box::new(commission.clone()))?;

        Ok(Self {
            signed_block,
            missed_blocks,
            status,
            active_set,
            is_bonded,
            is_jailed,
            tokens,
            commission,
        })
    }
}

/// Mempool occupancy metrics.
#[derive(Clone)]
pub struct MempoolMetrics {
    /// Current number of transactions in the mempool.
    pub size: Gauge,
    /// Total number of transactions reported by the node.
    pub total: Gauge,
    /// Total size of mempool transactions in bytes.
    pub total_bytes: Gauge,
}

impl MempoolMetrics {
    /// Registers mempool metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let size = Gauge::with_opts(Opts::new(
            "validator_mempool_size",
            "Current size of the mempool in transactions",
        ))?;
        registry.register(Box::new(size.clone()))?;

        let total = Gauge::with_opts(Opts::new(
            "validator_mempool_total",
            "Total number of transactions in the mempool",
        ))?;
        registry.register(Box::new(total.clone()))?;

        let total_bytes = Gauge::with_opts(Opts::new(
            "validator_mempool_total_bytes",
            "Total size of transactions in the mempool in bytes",
        ))?;
        registry.register(Box::new(total_bytes.clone()))?;

        Ok(Self {
            size,
            total,
            total_bytes,
        })
    }
}

/// Wrapper around a Prometheus registry and the watcher metric groups.
///
/// This is the main handle passed around the exporter. It can be wrapped
/// in an [`Arc`] and shared between the tracker task and HTTP handlers.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub chain: ChainMetrics,
    pub validator: ValidatorMetrics,
    pub mempool: MempoolMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh underlying namespaced
    /// `Registry` and registers all metric groups.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some(METRIC_NAMESPACE.to_string()), None)?;
        let chain = ChainMetrics::register(&registry)?;
        let validator = ValidatorMetrics::register(&registry)?;
        let mempool = MempoolMetrics::register(&registry)?;
        Ok(Self {
            registry,
            chain,
            validator,
            mempool,
        })
    }

    /// Encodes all metrics in this registry into the Prometheus text
    /// exposition format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_groups_register_and_record() {
        let metrics = MetricsRegistry::new().expect("create metrics registry");

        metrics.chain.block_height.set(42);
        metrics.chain.tracked_blocks.inc();
        metrics
            .validator
            .signed_block
            .with_label_values(&["validator1", "42"])
            .set(1.0);
        metrics.mempool.size.set(7.0);

        let text = metrics.gather_text();
        assert!(text.contains("beaconwatch_validator_block_height 42"));
        assert!(text.contains("beaconwatch_validator_tracked_blocks 1"));
        assert!(text.contains("beaconwatch_validator_beacon_block_signed"));
        assert!(text.contains("beaconwatch_validator_mempool_size 7"));
    }

    #[test]
    fn gauge_writes_are_last_write_wins() {
        let metrics = MetricsRegistry::new().expect("create metrics registry");
        let gauge = metrics
            .validator
            .missed_blocks
            .with_label_values(&["validator1", "devnet"]);

        gauge.set(1.0);
        gauge.set(0.0);
        assert_eq!(gauge.get(), 0.0);
    }
}
