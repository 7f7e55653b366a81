//! Error handling for trade batching, encoding and settlement submission.
//!
//! Errors are grouped by the component that raises them:
//!
//! - **`BatchError`**: violations of the trade operation's commit protocol
//! - **`EncodingError`**: trade data that cannot be encoded for a trader contract
//! - **`SubmissionError`**: failures surfaced by a settlement submitter
//! - **`ConfigError`**: missing or invalid configuration
//! - **`UtilityError`**: parsing of addresses and amounts
//!
//! `TradeError` wraps all of them and is the error type of the crate-level
//! [`Result`] alias, so `?` works across component boundaries.

pub mod batch;
pub mod config;
pub mod encoding;
pub mod submission;
pub mod utility;

pub use batch::BatchError;
pub use config::ConfigError;
pub use encoding::EncodingError;
pub use submission::{SubmissionError, SubmissionOutcome};
pub use utility::UtilityError;

/// Main result type for the library
pub type Result<T> = std::result::Result<T, TradeError>;

/// Top-level error enum for the library.
///
/// Submission errors are carried unchanged inside [`TradeError::Submission`], so a
/// caller can still inspect the submitter's own failure after a commit rejects.
#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    /// The trade operation refused an append or commit.
    #[error("Batch operation failed: {0}")]
    Batch(#[from] BatchError),

    /// A trade leg could not be encoded.
    #[error("Trade data encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    /// The settlement submitter failed.
    ///
    /// The commit lock has already been released when this error reaches the caller.
    #[error("Settlement submission failed: {0}")]
    Submission(#[from] SubmissionError),

    /// Configuration could not be loaded or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error in utility functions or type conversions.
    #[error("Utility error: {0}")]
    Utility(#[from] UtilityError),

    /// Generic error for cases not covered by specific error types.
    #[error("Generic error: {0}")]
    Other(#[from] anyhow::Error),
}

impl TradeError {
    /// Whether the error is the commit lock refusing an operation.
    pub fn is_already_committed(&self) -> bool {
        matches!(self, TradeError::Batch(BatchError::AlreadyCommitted))
    }

    /// Whether the error is a commit on a batch without legs.
    pub fn is_empty_batch(&self) -> bool {
        matches!(self, TradeError::Batch(BatchError::EmptyBatch))
    }

    /// Outcome classification of a submission failure, `None` for any other error.
    pub fn submission_outcome(&self) -> Option<SubmissionOutcome> {
        match self {
            TradeError::Submission(err) => Some(err.outcome()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    #[test]
    fn test_batch_predicates() {
        let err: TradeError = BatchError::AlreadyCommitted.into();
        assert!(err.is_already_committed());
        assert!(!err.is_empty_batch());
        assert!(err.submission_outcome().is_none());

        let err: TradeError = BatchError::EmptyBatch.into();
        assert!(err.is_empty_batch());
    }

    #[test]
    fn test_submission_outcome_passthrough() {
        let err: TradeError = SubmissionError::ConfirmationTimeout {
            transaction_hash: B256::ZERO,
            timeout_ms: 10,
        }
        .into();
        assert_eq!(err.submission_outcome(), Some(SubmissionOutcome::Unknown));

        let err: TradeError = SubmissionError::Rejected {
            reason: "nonce too low".to_string(),
        }
        .into();
        assert_eq!(err.submission_outcome(), Some(SubmissionOutcome::NotApplied));
        assert!(err.to_string().contains("nonce too low"));
    }
}
