//! Trade data encoding for the perpetual's trader contracts.
//!
//! Every trade leg carries an opaque `data` blob that only its trader contract
//! interprets. This module defines the [`TradeDataEncoder`] seam the trade operation
//! calls through, and [`AbiTradeDataEncoder`], the ABI layout the order-book,
//! liquidation and deleveraging traders expect:
//!
//! - **Fills**: `Order ++ Fill ++ typed signature` (see [`orders`])
//! - **Liquidations / deleverages**: `(uint256 amount, bool isBuy, bool allOrNothing)`
//!
//! Signed amounts are split into magnitude and direction, with `isBuy` set for
//! strictly positive amounts.

pub mod orders;

pub use orders::{Fill, Order, SignedOrder, TYPED_SIGNATURE_LENGTH};

use alloy::primitives::{Bytes, I256};
use alloy::sol_types::SolValue;
use crate::errors::EncodingError;
use crate::utils::split_signed;

/// Result alias for encoder implementations.
pub type EncodingResult<T> = std::result::Result<T, EncodingError>;

mod position_trade {
    use alloy::sol;
    sol! {
        #[derive(Debug)]
        struct TradeData {
            uint256 amount;
            bool isBuy;
            bool allOrNothing;
        }
    }
}

/// Produces trader-specific data blobs for each kind of trade leg.
///
/// Implementations must be pure: the same parameters always produce the same bytes.
pub trait TradeDataEncoder: Send + Sync {
    /// Data for filling a signed order through the order-book trader.
    fn fill_trade_data(&self, order: &SignedOrder, fill: &Fill) -> EncodingResult<Bytes>;

    /// Data for the liquidation trader.
    fn liquidate_trade_data(&self, amount: I256, all_or_nothing: bool) -> EncodingResult<Bytes>;

    /// Data for the deleveraging trader.
    fn deleverage_trade_data(&self, amount: I256, all_or_nothing: bool) -> EncodingResult<Bytes>;
}

/// ABI encoder matching the perpetual's on-chain trader contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbiTradeDataEncoder;

impl AbiTradeDataEncoder {
    pub fn new() -> Self {
        Self
    }

    fn position_trade_data(amount: I256, all_or_nothing: bool) -> Bytes {
        let (magnitude, is_buy) = split_signed(amount);
        let data = position_trade::TradeData {
            amount: magnitude,
            isBuy: is_buy,
            allOrNothing: all_or_nothing,
        };
        Bytes::from(data.abi_encode())
    }
}

impl TradeDataEncoder for AbiTradeDataEncoder {
    fn fill_trade_data(&self, order: &SignedOrder, fill: &Fill) -> EncodingResult<Bytes> {
        orders::fill_trade_data(order, fill)
    }

    fn liquidate_trade_data(&self, amount: I256, all_or_nothing: bool) -> EncodingResult<Bytes> {
        Ok(Self::position_trade_data(amount, all_or_nothing))
    }

    fn deleverage_trade_data(&self, amount: I256, all_or_nothing: bool) -> EncodingResult<Bytes> {
        Ok(Self::position_trade_data(amount, all_or_nothing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    fn word(value: u64) -> [u8; 32] {
        U256::from(value).to_be_bytes::<32>()
    }

    #[test]
    fn test_liquidate_trade_data_buy() {
        let encoder = AbiTradeDataEncoder::new();
        let data = encoder
            .liquidate_trade_data(I256::try_from(750i64).unwrap(), false)
            .unwrap();

        assert_eq!(data.len(), 96);
        assert_eq!(&data[..32], &word(750));
        assert_eq!(&data[32..64], &word(1));
        assert_eq!(&data[64..], &word(0));
    }

    #[test]
    fn test_deleverage_trade_data_sell_all_or_nothing() {
        let encoder = AbiTradeDataEncoder::new();
        let data = encoder
            .deleverage_trade_data(I256::try_from(-750i64).unwrap(), true)
            .unwrap();

        assert_eq!(&data[..32], &word(750));
        assert_eq!(&data[32..64], &word(0));
        assert_eq!(&data[64..], &word(1));
    }

    #[test]
    fn test_liquidate_and_deleverage_share_layout() {
        let encoder = AbiTradeDataEncoder::new();
        let amount = I256::try_from(12i64).unwrap();
        assert_eq!(
            encoder.liquidate_trade_data(amount, true).unwrap(),
            encoder.deleverage_trade_data(amount, true).unwrap()
        );
    }
}
