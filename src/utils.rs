//! Utility functions and type conversions for trade data.
//!
//! Addresses are compared and ordered as raw bytes everywhere in the crate. The
//! textual normal form is lowercase `0x`-prefixed hex; for fixed-width addresses
//! ordering by that string and ordering by bytes agree, which is what makes the
//! settlement account list canonical.

use alloy::primitives::{Address, I256, U256};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use crate::errors::{EncodingError, Result, UtilityError};
use crate::EncodingResult;

/// Parse a string representation of an Ethereum address.
///
/// Accepts addresses with or without the "0x" prefix, in any letter case. Mixed-case
/// input is not checksum-validated: addresses are case-normalized, not verified.
///
/// # Errors
///
/// This function will return an error if:
/// - The string contains invalid hex characters
/// - The string is not exactly 40 hex characters (after removing 0x prefix)
pub fn parse_address(s: &str) -> Result<Address> {
    let normalized = s.trim().to_ascii_lowercase();
    Address::from_str(normalized.trim_start_matches("0x"))
        .map_err(|source| UtilityError::AddressParsingFailed {
            input: s.to_string(),
            source: alloy::primitives::AddressError::Hex(source),
        }.into())
}

/// Lowercase `0x`-prefixed hex form of an address.
pub fn lower_hex(address: &Address) -> String {
    format!("{address:#x}")
}

/// Parse a signed decimal amount such as `-1500` into an `I256`.
pub fn parse_signed_amount(s: &str) -> Result<I256> {
    I256::from_dec_str(s.trim()).map_err(|e| UtilityError::AmountParsingFailed {
        input: s.to_string(),
        reason: e.to_string(),
    }.into())
}

/// Parse an unsigned decimal (or `0x` hex) amount into a `U256`.
pub fn parse_unsigned_amount(s: &str) -> Result<U256> {
    U256::from_str(s.trim()).map_err(|e| UtilityError::AmountParsingFailed {
        input: s.to_string(),
        reason: e.to_string(),
    }.into())
}

/// Split a signed amount into its magnitude and whether it is strictly positive.
///
/// Trader contracts take unsigned amounts with a separate direction flag; zero counts
/// as a sell.
pub fn split_signed(amount: I256) -> (U256, bool) {
    (amount.unsigned_abs(), amount.is_positive())
}

/// Convert an optional expiration time into unix seconds, `0` meaning no expiry.
pub fn expiration_seconds(expiration: Option<DateTime<Utc>>) -> EncodingResult<U256> {
    match expiration {
        None => Ok(U256::ZERO),
        Some(at) => {
            let timestamp = at.timestamp();
            u64::try_from(timestamp)
                .map(U256::from)
                .map_err(|_| EncodingError::InvalidExpiration { timestamp })
        }
    }
}
