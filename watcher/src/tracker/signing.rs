//! Beacon-style signing inference.
//!
//! On this chain a block header does not carry the signer set for its
//! own height; attestations for height `H` only appear in the commit
//! attached to the following block. Equivalently, when the tracker
//! observes a new block at height `H`, it fetches block `H - 1` and
//! reads *its* commit signatures as the signer decision relevant to `H`.
//!
//! This module holds the pure parts of that decision; the RPC round trip
//! and metric writes live in [`super::engine`].

use std::collections::HashSet;

/// Height whose commit is fetched to infer signing status for `height`.
///
/// Returns `None` for heights 0 and 1: height 0 has no predecessor, and
/// height 1's predecessor is 0, which the RPC encodes as "latest" — so a
/// request for it would silently return the wrong block. `None` means
/// "no signing data available", not an error.
pub fn inference_height(height: u64) -> Option<u64> {
    height.checked_sub(1).filter(|p| *p >= 1)
}

/// Signed flag for a tracked address against a signer set.
///
/// An address absent from the signer set is counted as missed, never
/// dropped.
pub fn signed_flag(signers: &HashSet<&str>, address: &str) -> f64 {
    if signers.contains(address) { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_inference_height_at_or_below_one() {
        assert_eq!(inference_height(0), None);
        assert_eq!(inference_height(1), None);
        assert_eq!(inference_height(2), Some(1));
        assert_eq!(inference_height(1_000_000), Some(999_999));
    }

    #[test]
    fn absent_address_counts_as_missed() {
        let signers: HashSet<&str> = ["AAAA"].into_iter().collect();
        assert_eq!(signed_flag(&signers, "AAAA"), 1.0);
        assert_eq!(signed_flag(&signers, "BBBB"), 0.0);
    }
}
