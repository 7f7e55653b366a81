//! Settlement submission for committed trade operations.
//!
//! This module provides the submission seam of the crate:
//! - `SettlementSubmitter`: the async interface a trade operation commits through
//! - `SendOptions` / `ConfirmationType`: per-commit submission configuration
//! - `TxResult`: what a successful submission reports back
//! - `RpcSubmitter`: JSON-RPC implementation that signs and broadcasts the call

pub mod rpc;

// Re-export the RPC submitter for convenience
pub use rpc::RpcSubmitter;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::errors::SubmissionError;
use crate::operation::IndexedTradeLeg;

/// Result alias for submitter implementations.
pub type SubmissionResult<T> = std::result::Result<T, SubmissionError>;

/// How far a submission proceeds before it reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationType {
    /// Return once the transaction hash is known.
    Hash,
    /// Wait for the transaction to be mined successfully.
    #[default]
    Confirmed,
    /// Wait for the hash and the receipt; reported as confirmed.
    Both,
    /// Evaluate the call without broadcasting anything.
    Simulate,
}

/// Submission configuration for a single commit.
///
/// Unset gas fields fall back to the submitter's configured values and an unset
/// nonce is read from the node; nothing is estimated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOptions {
    pub confirmation: ConfirmationType,
    pub gas: Option<u64>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub nonce: Option<u64>,
    pub value: Option<U256>,
}

impl SendOptions {
    /// Options for the given confirmation type with every other field unset.
    pub fn new(confirmation: ConfirmationType) -> Self {
        Self {
            confirmation,
            ..Default::default()
        }
    }

    /// Dry-run options: the call is evaluated and the operation stays open.
    pub fn simulate() -> Self {
        Self::new(ConfirmationType::Simulate)
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_fees(mut self, max_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        self.max_fee_per_gas = Some(max_fee_per_gas);
        self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Whether these options request a dry run.
    pub fn is_simulation(&self) -> bool {
        self.confirmation == ConfirmationType::Simulate
    }
}

/// Report of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxResult {
    /// The call was evaluated without being broadcast.
    Simulated { return_data: Bytes },
    /// The transaction was accepted by the node.
    Sent { transaction_hash: B256 },
    /// The transaction was mined with a success status.
    Confirmed {
        transaction_hash: B256,
        block_number: u64,
        gas_used: u64,
    },
}

impl TxResult {
    /// Hash of the broadcast transaction, if anything was broadcast.
    pub fn transaction_hash(&self) -> Option<B256> {
        match self {
            TxResult::Simulated { .. } => None,
            TxResult::Sent { transaction_hash } | TxResult::Confirmed { transaction_hash, .. } => {
                Some(*transaction_hash)
            }
        }
    }
}

/// Sends a settlement call built from a trade operation.
///
/// `accounts` is the canonical account list and every leg in `trades` indexes into
/// it. Implementations submit the whole batch as one call or fail; they never retry.
#[async_trait]
pub trait SettlementSubmitter: Send + Sync {
    async fn submit(
        &self,
        accounts: &[Address],
        trades: &[IndexedTradeLeg],
        options: Option<&SendOptions>,
    ) -> SubmissionResult<TxResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_options_defaults() {
        let options = SendOptions::default();
        assert_eq!(options.confirmation, ConfirmationType::Confirmed);
        assert!(!options.is_simulation());
        assert!(options.gas.is_none() && options.nonce.is_none());

        assert!(SendOptions::simulate().is_simulation());

        let tuned = SendOptions::new(ConfirmationType::Hash)
            .with_gas(500_000)
            .with_fees(30, 2)
            .with_nonce(9);
        assert_eq!(tuned.gas, Some(500_000));
        assert_eq!(tuned.max_fee_per_gas, Some(30));
        assert_eq!(tuned.max_priority_fee_per_gas, Some(2));
        assert_eq!(tuned.nonce, Some(9));
    }

    #[test]
    fn test_tx_result_hash() {
        let hash = B256::repeat_byte(3);
        assert_eq!(TxResult::Sent { transaction_hash: hash }.transaction_hash(), Some(hash));
        assert_eq!(
            TxResult::Simulated { return_data: Bytes::new() }.transaction_hash(),
            None
        );
    }

    #[test]
    fn test_tx_result_serializes_with_kind_tag() {
        let json = serde_json::to_value(TxResult::Confirmed {
            transaction_hash: B256::ZERO,
            block_number: 12,
            gas_used: 21_000,
        })
        .unwrap();
        assert_eq!(json["kind"], "confirmed");
        assert_eq!(json["block_number"], 12);
    }
}
