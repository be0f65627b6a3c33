//! Block tracking and signing inference.
//!
//! The tracker owns the polling cadence and guarantees each block height
//! is processed at most once:
//!
//! - [`ProcessedHeights`] is the bounded dedup cache and processing gate,
//! - [`signing`] derives per-validator signing status one height in
//!   arrears from the previous block's commit,
//! - [`BlockTracker`] drives the fixed-interval polling loop and the
//!   per-block update sequence.

pub mod cache;
pub mod engine;
pub mod signing;

pub use cache::ProcessedHeights;
pub use engine::BlockTracker;
