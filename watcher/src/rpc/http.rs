//! HTTP implementation of the chain RPC client.
//!
//! This implementation of [`crate::rpc::ChainRpc`] talks to the chain
//! node's JSON-over-HTTP endpoints:
//!
//! - `GET /block` (latest) / `GET /block?height=N`,
//! - `GET /validators`,
//! - `GET /cosmos/staking/v1beta1/validators`,
//! - `GET /mempool`.
//!
//! Every call is bounded by the timeout configured on the underlying
//! reqwest client, so a hung node surfaces as [`RpcError::Transport`]
//! rather than stalling the polling loop.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::RpcConfig;

use super::types::{
    BlockResponse, MempoolResponse, StakingValidatorsResponse, ValidatorSetResponse,
};
use super::{ChainRpc, RpcError};

/// Reqwest-backed chain RPC client.
///
/// Cloneable and thread-safe; the embedded [`Client`] pools connections
/// internally.
#[derive(Clone)]
pub struct HttpChainRpc {
    base_url: String,
    client: Client,
}

impl HttpChainRpc {
    /// Constructs a new client from the RPC configuration.
    pub fn new(cfg: &RpcConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        // Avoid accidental double slashes.
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, RpcError> {
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RpcError::Transport(format!("HTTP GET {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RpcError::Status(format!(
                "GET {url} returned HTTP status {status}"
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| RpcError::Protocol(format!("failed to parse JSON from {url}: {e}")))
    }
}

impl ChainRpc for HttpChainRpc {
    async fn block(&self, height: Option<u64>) -> Result<BlockResponse, RpcError> {
        let url = match height {
            Some(h) => format!("{}?height={h}", self.endpoint("/block")),
            None => self.endpoint("/block"),
        };
        self.get_json(url).await
    }

    async fn validator_set(&self) -> Result<ValidatorSetResponse, RpcError> {
        self.get_json(self.endpoint("/validators")).await
    }

    async fn staking_validators(&self) -> Result<StakingValidatorsResponse, RpcError> {
        self.get_json(self.endpoint("/cosmos/staking/v1beta1/validators"))
            .await
    }

    async fn mempool(&self) -> Result<MempoolResponse, RpcError> {
        self.get_json(self.endpoint("/mempool")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_client(base_url: &str) -> HttpChainRpc {
        HttpChainRpc::new(&RpcConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(1),
        })
        .expect("client should build")
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let rpc = test_client("http://127.0.0.1:26657/");
        assert_eq!(rpc.endpoint("/block"), "http://127.0.0.1:26657/block");
        assert_eq!(rpc.endpoint("validators"), "http://127.0.0.1:26657/validators");
    }

    #[tokio::test]
    async fn unreachable_node_is_a_transport_error() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let rpc = test_client("http://192.0.2.1:1");
        let err = rpc.block(None).await.expect_err("fetch should fail");
        assert!(matches!(err, RpcError::Transport(_)));
    }
}
