//! Chain RPC client.
//!
//! This module defines a trait [`ChainRpc`] that abstracts over the chain
//! node's JSON-over-HTTP endpoints, the response types those endpoints
//! return, and a reqwest-backed implementation [`HttpChainRpc`].
//!
//! The trait exists so the block tracker can be exercised in tests with a
//! scripted implementation instead of a live node.

use std::fmt;

pub mod http;
pub mod types;

pub use http::HttpChainRpc;
pub use types::{
    BlockResponse, MempoolResponse, StakingValidatorsResponse, ValidatorSetResponse,
};

/// Errors that can occur while contacting the chain node.
#[derive(Debug)]
pub enum RpcError {
    /// Transport-level error (e.g. connection refused, timeout).
    Transport(String),
    /// The node answered with a non-success HTTP status.
    Status(String),
    /// The node returned a malformed or unexpected response body.
    Protocol(String),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Transport(msg) => write!(f, "rpc transport error: {msg}"),
            RpcError::Status(msg) => write!(f, "rpc status error: {msg}"),
            RpcError::Protocol(msg) => write!(f, "rpc protocol error: {msg}"),
        }
    }
}

impl std::error::Error for RpcError {}

/// Abstract chain RPC consumed by the block tracker.
///
/// All calls are stateless request/decode round trips. `block(None)`
/// fetches the latest block; `block(Some(h))` fetches height `h`.
/// Implementations must bound each call with a timeout so a hung node
/// cannot starve the polling loop.
pub trait ChainRpc {
    fn block(
        &self,
        height: Option<u64>,
    ) -> impl Future<Output = Result<BlockResponse, RpcError>> + Send;

    fn validator_set(
        &self,
    ) -> impl Future<Output = Result<ValidatorSetResponse, RpcError>> + Send;

    fn staking_validators(
        &self,
    ) -> impl Future<Output = Result<StakingValidatorsResponse, RpcError>> + Send;

    fn mempool(&self) -> impl Future<Output = Result<MempoolResponse, RpcError>> + Send;
}
