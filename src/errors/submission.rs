//! Settlement submission errors.

use alloy::primitives::B256;

/// What a failed submission is known to have done on chain.
///
/// A trade operation releases its commit lock on every failure. The outcome tells
/// the caller whether resubmitting the same batch can double-settle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The trade call had no effect: it was rejected, never broadcast, or reverted.
    NotApplied,
    /// The transaction may have been broadcast and may still be included.
    Unknown,
}

/// Errors that can occur while submitting a settlement call
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("RPC method {method} failed with code {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid response to {method}: {message}")]
    InvalidResponse { method: String, message: String },

    #[error("Failed to build typed transaction: {reason}")]
    TransactionBuildFailed { reason: String },

    #[error("Transaction signing failed: {reason}")]
    TransactionSigningFailed { reason: String },

    #[error("Signer error: {0}")]
    Signer(#[from] alloy::signers::Error),

    #[error("Transaction {transaction_hash} reverted")]
    Reverted { transaction_hash: B256 },

    #[error("Receipt for transaction {transaction_hash} unavailable: {reason}")]
    ReceiptUnavailable {
        transaction_hash: B256,
        reason: String,
    },

    #[error("Transaction {transaction_hash} not confirmed after {timeout_ms}ms")]
    ConfirmationTimeout {
        transaction_hash: B256,
        timeout_ms: u64,
    },

    #[error("Submission rejected: {reason}")]
    Rejected { reason: String },
}

/// Node messages for a raw transaction whose hash or nonce is already taken.
///
/// The same settlement may already be pending or mined, so such a rejection says
/// nothing about whether the batch was applied.
const NONCE_IN_USE_MESSAGES: [&str; 4] = [
    "already known",
    "known transaction",
    "nonce too low",
    "replacement transaction underpriced",
];

impl SubmissionError {
    /// Classify the failure by whether the trade call can have taken effect.
    pub fn outcome(&self) -> SubmissionOutcome {
        match self {
            SubmissionError::Rpc { method, message, .. }
                if method == "eth_sendRawTransaction" && nonce_in_use(message) =>
            {
                SubmissionOutcome::Unknown
            }
            SubmissionError::Rpc { .. }
            | SubmissionError::TransactionBuildFailed { .. }
            | SubmissionError::TransactionSigningFailed { .. }
            | SubmissionError::Signer(_)
            | SubmissionError::Reverted { .. }
            | SubmissionError::Rejected { .. } => SubmissionOutcome::NotApplied,
            SubmissionError::Network(_)
            | SubmissionError::Serialization(_)
            | SubmissionError::InvalidResponse { .. }
            | SubmissionError::ReceiptUnavailable { .. }
            | SubmissionError::ConfirmationTimeout { .. } => SubmissionOutcome::Unknown,
        }
    }
}

fn nonce_in_use(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    NONCE_IN_USE_MESSAGES
        .iter()
        .any(|known| message.contains(known))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        let rejected = SubmissionError::Rpc {
            method: "eth_sendRawTransaction".to_string(),
            code: -32000,
            message: "insufficient funds".to_string(),
        };
        assert_eq!(rejected.outcome(), SubmissionOutcome::NotApplied);

        let reverted = SubmissionError::Reverted {
            transaction_hash: B256::repeat_byte(1),
        };
        assert_eq!(reverted.outcome(), SubmissionOutcome::NotApplied);

        let lost = SubmissionError::ReceiptUnavailable {
            transaction_hash: B256::repeat_byte(2),
            reason: "connection reset".to_string(),
        };
        assert_eq!(lost.outcome(), SubmissionOutcome::Unknown);

        let malformed = SubmissionError::InvalidResponse {
            method: "eth_sendRawTransaction".to_string(),
            message: "empty response".to_string(),
        };
        assert_eq!(malformed.outcome(), SubmissionOutcome::Unknown);
    }

    #[test]
    fn test_raw_transaction_nonce_conflicts_are_unknown() {
        for message in [
            "already known",
            "Known transaction: 0x1234",
            "nonce too low: next nonce 8, tx nonce 7",
            "replacement transaction underpriced",
        ] {
            let err = SubmissionError::Rpc {
                method: "eth_sendRawTransaction".to_string(),
                code: -32000,
                message: message.to_string(),
            };
            assert_eq!(err.outcome(), SubmissionOutcome::Unknown, "{}", message);
        }

        let simulated = SubmissionError::Rpc {
            method: "eth_call".to_string(),
            code: -32000,
            message: "nonce too low".to_string(),
        };
        assert_eq!(simulated.outcome(), SubmissionOutcome::NotApplied);
    }
}
