//! Response shapes for the chain node's JSON endpoints.
//!
//! These structs mirror the upstream wire format, which carries numeric
//! values as decimal strings. Accessor methods do the string-to-number
//! conversion and surface failures as [`RpcError::Protocol`].

use std::collections::HashSet;

use serde::Deserialize;

use super::RpcError;

/// Response of `GET /block` and `GET /block?height=N`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlockResponse {
    #[serde(default)]
    pub result: BlockResult,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlockResult {
    #[serde(default)]
    pub block: BlockBody,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlockBody {
    #[serde(default)]
    pub header: BlockHeader,
    #[serde(default)]
    pub last_commit: Commit,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlockHeader {
    /// Block height as a decimal string.
    #[serde(default)]
    pub height: String,
}

/// Commit structure attached to a block, attesting the previous height.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub signatures: Vec<CommitSignature>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommitSignature {
    #[serde(default)]
    pub validator_address: String,
    /// Empty when the validator did not sign.
    #[serde(default)]
    pub signature: String,
}

impl BlockResponse {
    /// Parses the header height.
    pub fn height(&self) -> Result<u64, RpcError> {
        let raw = &self.result.block.header.height;
        raw.parse::<u64>().map_err(|e| {
            RpcError::Protocol(format!("unparseable block height {raw:?}: {e}"))
        })
    }

    /// Addresses that contributed a non-empty signature to this block's
    /// commit. An address missing here either missed or is not in the set;
    /// callers decide what that means.
    pub fn signer_set(&self) -> HashSet<&str> {
        self.result
            .block
            .last_commit
            .signatures
            .iter()
            .filter(|sig| !sig.signature.is_empty())
            .map(|sig| sig.validator_address.as_str())
            .collect()
    }
}

/// Response of `GET /validators`: the current consensus validator set.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ValidatorSetResponse {
    #[serde(default)]
    pub validators: Vec<ConsensusValidator>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConsensusValidator {
    #[serde(default)]
    pub address: String,
}

impl ValidatorSetResponse {
    /// Addresses currently in the active consensus set.
    pub fn active_addresses(&self) -> HashSet<&str> {
        self.validators.iter().map(|v| v.address.as_str()).collect()
    }
}

/// Response of `GET /cosmos/staking/v1beta1/validators`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StakingValidatorsResponse {
    #[serde(default)]
    pub validators: Vec<StakingValidator>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StakingValidator {
    #[serde(default)]
    pub operator_address: String,
    #[serde(default)]
    pub jailed: bool,
    /// Bonding status, e.g. `"BOND_STATUS_BONDED"`.
    #[serde(default)]
    pub status: String,
    /// Staked tokens as a decimal string.
    #[serde(default)]
    pub tokens: String,
    #[serde(default)]
    pub description: StakingDescription,
    #[serde(default)]
    pub commission: StakingCommission,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StakingDescription {
    #[serde(default)]
    pub moniker: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StakingCommission {
    #[serde(default)]
    pub commission_rates: CommissionRates,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommissionRates {
    /// Commission rate as a decimal string, e.g. `"0.05"`.
    #[serde(default)]
    pub rate: String,
}

impl StakingValidator {
    pub fn is_bonded(&self) -> bool {
        self.status == "BOND_STATUS_BONDED"
    }

    pub fn tokens_value(&self) -> Option<f64> {
        self.tokens.parse().ok()
    }

    pub fn commission_rate(&self) -> Option<f64> {
        self.commission.commission_rates.rate.parse().ok()
    }
}

/// Response of `GET /mempool`: current mempool occupancy.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MempoolResponse {
    #[serde(default)]
    pub result: MempoolResult,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MempoolResult {
    #[serde(default)]
    pub n_txs: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub total_bytes: String,
}

impl MempoolResponse {
    pub fn n_txs(&self) -> Option<f64> {
        self.result.n_txs.parse().ok()
    }

    pub fn total(&self) -> Option<f64> {
        self.result.total.parse().ok()
    }

    pub fn total_bytes(&self) -> Option<f64> {
        self.result.total_bytes.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_response_parses_height_and_signers() {
        let json = r#"
        {
          "result": {
            "block": {
              "header": { "height": "12345" },
              "last_commit": {
                "signatures": [
                  { "validator_address": "AAAA", "signature": "c2lnbmF0dXJl" },
                  { "validator_address": "BBBB", "signature": "" }
                ]
              }
            }
          }
        }
        "#;

        let block: BlockResponse = serde_json::from_str(json).expect("BlockResponse should parse");
        assert_eq!(block.height().expect("height should parse"), 12345);

        let signers = block.signer_set();
        assert!(signers.contains("AAAA"));
        assert!(!signers.contains("BBBB"));
    }

    #[test]
    fn block_response_rejects_garbage_height() {
        let block = BlockResponse::default();
        assert!(matches!(block.height(), Err(RpcError::Protocol(_))));
    }

    #[test]
    fn staking_validator_accessors() {
        let json = r#"
        {
          "validators": [
            {
              "operator_address": "valoper1xyz",
              "jailed": false,
              "status": "BOND_STATUS_BONDED",
              "tokens": "1000000",
              "description": { "moniker": "validator1" },
              "commission": { "commission_rates": { "rate": "0.050000000000000000" } }
            }
          ]
        }
        "#;

        let resp: StakingValidatorsResponse =
            serde_json::from_str(json).expect("StakingValidatorsResponse should parse");
        let v = &resp.validators[0];
        assert!(v.is_bonded());
        assert!(!v.jailed);
        assert_eq!(v.tokens_value(), Some(1_000_000.0));
        assert_eq!(v.commission_rate(), Some(0.05));
        assert_eq!(v.description.moniker, "validator1");
    }

    #[test]
    fn mempool_response_tolerates_missing_fields() {
        let resp: MempoolResponse =
            serde_json::from_str(r#"{ "result": { "n_txs": "7" } }"#).expect("should parse");
        assert_eq!(resp.n_txs(), Some(7.0));
        assert_eq!(resp.total(), None);
        assert_eq!(resp.total_bytes(), None);
    }

    #[test]
    fn validator_set_collects_addresses() {
        let resp: ValidatorSetResponse = serde_json::from_str(
            r#"{ "validators": [ { "address": "AAAA" }, { "address": "BBBB" } ] }"#,
        )
        .expect("should parse");
        let active = resp.active_addresses();
        assert_eq!(active.len(), 2);
        assert!(active.contains("AAAA"));
    }
}
