//! Trade operation protocol errors.

use alloy::primitives::Address;

/// Errors raised by a trade operation before anything is submitted
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Operation already committed")]
    AlreadyCommitted,

    #[error("No trades have been added to the operation")]
    EmptyBatch,

    #[error("Account {address} is missing from the settlement account list")]
    UnindexedAccount { address: Address },
}
