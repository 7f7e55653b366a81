//! Signed orders and the order-book trader's trade data layout.

use alloy::primitives::{Address, Bytes, B256, I256, U256};
use alloy::sol_types::SolValue;
use chrono::{DateTime, Utc};
use crate::errors::EncodingError;
use crate::EncodingResult;
use crate::utils::{expiration_seconds, split_signed};

/// Length of a typed signature: `r` (32) + `s` (32) + `v` (1) + signature type (1).
pub const TYPED_SIGNATURE_LENGTH: usize = 66;

/// Width the typed signature is zero-padded to inside trade data.
const PADDED_SIGNATURE_LENGTH: usize = 96;

const FLAG_MASK_IS_BUY: u8 = 1;
const FLAG_MASK_IS_DECREASE_ONLY: u8 = 2;
const FLAG_MASK_IS_NEGATIVE_LIMIT_FEE: u8 = 4;

mod p1_orders {
    use alloy::sol;
    sol! {
        #[derive(Debug)]
        struct Order {
            bytes32 flags;
            uint256 amount;
            uint256 limitPrice;
            uint256 triggerPrice;
            uint256 limitFee;
            address maker;
            address taker;
            uint256 expiration;
        }

        #[derive(Debug)]
        struct Fill {
            uint256 amount;
            uint256 price;
            uint256 fee;
            bool isNegativeFee;
        }
    }
}

/// An order as signed by its maker.
///
/// Prices and fees are 18-decimal fixed point values already scaled to integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub is_buy: bool,
    pub is_decrease_only: bool,
    pub amount: U256,
    pub limit_price: U256,
    pub trigger_price: U256,
    pub limit_fee: I256,
    pub maker: Address,
    pub taker: Address,
    pub expiration: Option<DateTime<Utc>>,
    pub salt: U256,
}

impl Order {
    /// Pack the boolean order fields into the low nibble of the salt.
    pub fn flags(&self) -> B256 {
        let mut bits = 0u8;
        if self.is_buy {
            bits |= FLAG_MASK_IS_BUY;
        }
        if self.is_decrease_only {
            bits |= FLAG_MASK_IS_DECREASE_ONLY;
        }
        if self.limit_fee.is_negative() {
            bits |= FLAG_MASK_IS_NEGATIVE_LIMIT_FEE;
        }

        let flags: U256 = ((self.salt >> 4usize) << 4usize) | U256::from(bits);
        B256::from(flags.to_be_bytes::<32>())
    }
}

/// An order together with its maker's typed signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    pub order: Order,
    pub typed_signature: Bytes,
}

impl SignedOrder {
    pub fn new(order: Order, typed_signature: Bytes) -> Self {
        Self { order, typed_signature }
    }

    pub fn maker(&self) -> Address {
        self.order.maker
    }

    pub fn taker(&self) -> Address {
        self.order.taker
    }
}

/// Terms a signed order is filled at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub amount: U256,
    pub price: U256,
    /// Negative fees are rebates to the filler.
    pub fee: I256,
}

/// Encode `order ++ fill ++ padded signature` for the order-book trader.
pub(crate) fn fill_trade_data(signed: &SignedOrder, fill: &Fill) -> EncodingResult<Bytes> {
    let signature = signed.typed_signature.as_ref();
    if signature.len() != TYPED_SIGNATURE_LENGTH {
        return Err(EncodingError::InvalidSignatureLength {
            expected: TYPED_SIGNATURE_LENGTH,
            actual: signature.len(),
        });
    }

    let order = &signed.order;
    let (limit_fee, _) = split_signed(order.limit_fee);
    let sol_order = p1_orders::Order {
        flags: order.flags(),
        amount: order.amount,
        limitPrice: order.limit_price,
        triggerPrice: order.trigger_price,
        limitFee: limit_fee,
        maker: order.maker,
        taker: order.taker,
        expiration: expiration_seconds(order.expiration)?,
    };
    let sol_fill = p1_orders::Fill {
        amount: fill.amount,
        price: fill.price,
        fee: fill.fee.unsigned_abs(),
        isNegativeFee: fill.fee.is_negative(),
    };

    let mut data = sol_order.abi_encode();
    data.extend(sol_fill.abi_encode());
    data.extend_from_slice(signature);
    data.resize(data.len() + PADDED_SIGNATURE_LENGTH - TYPED_SIGNATURE_LENGTH, 0);

    Ok(Bytes::from(data))
}
