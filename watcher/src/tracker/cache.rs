//! Bounded cache of already-processed block heights.

use std::collections::HashSet;

/// How many of the most recent heights the cache retains.
pub const RETAINED_HEIGHTS: u64 = 1000;

/// Processing gate for the block tracker.
///
/// A height passes the gate only if it is strictly greater than the last
/// processed height and absent from the seen-set. The double condition
/// guards against both duplicate RPC responses and height regressions
/// (e.g. a node resync serving an older tip).
#[derive(Debug, Default)]
pub struct ProcessedHeights {
    last: u64,
    seen: HashSet<u64>,
}

impl ProcessedHeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently processed height, 0 if none yet.
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Whether `height` should be processed this tick.
    pub fn should_process(&self, height: u64) -> bool {
        height > self.last && !self.seen.contains(&height)
    }

    /// Records `height` as fully processed and evicts entries outside the
    /// most recent [`RETAINED_HEIGHTS`] window.
    pub fn mark_processed(&mut self, height: u64) {
        self.last = height;
        self.seen.insert(height);
        self.seen
            .retain(|&h| height.saturating_sub(h) < RETAINED_HEIGHTS);
    }

    pub fn contains(&self, height: u64) -> bool {
        self.seen.contains(&height)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_rejects_stale_and_duplicate_heights() {
        let mut cache = ProcessedHeights::new();
        assert!(cache.should_process(10));

        cache.mark_processed(10);
        assert!(!cache.should_process(10), "duplicate height must be rejected");
        assert!(!cache.should_process(9), "regressed height must be rejected");
        assert!(cache.should_process(11));
    }

    #[test]
    fn cache_is_bounded_to_the_most_recent_window() {
        let mut cache = ProcessedHeights::new();
        for h in 1..=1500 {
            cache.mark_processed(h);
        }

        assert_eq!(cache.len(), RETAINED_HEIGHTS as usize);
        assert!(!cache.contains(500), "entries outside the window are evicted");
        assert!(cache.contains(501));
        assert!(cache.contains(1500));
        assert_eq!(cache.last(), 1500);
    }

    #[test]
    fn eviction_tolerates_height_gaps() {
        let mut cache = ProcessedHeights::new();
        cache.mark_processed(1);
        cache.mark_processed(5_000);

        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(1));
        assert!(cache.contains(5_000));
    }
}
