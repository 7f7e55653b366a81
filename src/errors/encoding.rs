//! Trade data encoding errors.

/// Errors that can occur while encoding trade data for a trader contract
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("Invalid typed signature length: expected {expected} bytes, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    #[error("Order expiration {timestamp} is before the unix epoch")]
    InvalidExpiration { timestamp: i64 },
}
