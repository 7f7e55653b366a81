//! Canonical account ordering and leg indexing.
//!
//! The account list of a settlement is the deduplicated set of every maker and
//! taker, sorted ascending. Sorting `Address` values sorts their lowercase hex
//! forms, so the list depends only on which accounts appear, never on the order
//! legs were appended in.

use alloy::primitives::{Address, Bytes};
use itertools::Itertools;
use std::collections::HashMap;
use crate::errors::BatchError;
use crate::operation::{IndexedTradeLeg, TradeLeg};
use crate::BatchResult;

/// Position lookup over a canonical account list.
#[derive(Debug, Clone)]
pub struct AccountIndex {
    accounts: Vec<Address>,
    positions: HashMap<Address, usize>,
}

impl AccountIndex {
    /// Collect, deduplicate and sort the accounts referenced by `legs`.
    pub fn from_legs(legs: &[TradeLeg]) -> Self {
        let accounts: Vec<Address> = legs
            .iter()
            .flat_map(|leg| [leg.maker, leg.taker])
            .sorted()
            .dedup()
            .collect();

        let positions = accounts
            .iter()
            .enumerate()
            .map(|(index, account)| (*account, index))
            .collect();

        Self { accounts, positions }
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    pub fn position(&self, account: &Address) -> Option<usize> {
        self.positions.get(account).copied()
    }

    /// Rewrite legs in append order with maker and taker replaced by positions.
    pub fn index_legs(&self, legs: &[TradeLeg]) -> BatchResult<Vec<IndexedTradeLeg>> {
        legs.iter()
            .map(|leg| {
                Ok(IndexedTradeLeg {
                    maker_index: self.require(&leg.maker)?,
                    taker_index: self.require(&leg.taker)?,
                    trader: leg.trader,
                    data: leg.data.clone(),
                })
            })
            .collect()
    }

    fn require(&self, account: &Address) -> BatchResult<usize> {
        self.position(account)
            .ok_or(BatchError::UnindexedAccount { address: *account })
    }
}

/// The payload of one settlement call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    accounts: Vec<Address>,
    trades: Vec<IndexedTradeLeg>,
}

impl Settlement {
    /// Derive the settlement for `legs`.
    pub fn from_legs(legs: &[TradeLeg]) -> BatchResult<Self> {
        if legs.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let index = AccountIndex::from_legs(legs);
        let trades = index.index_legs(legs)?;

        Ok(Self {
            accounts: index.accounts,
            trades,
        })
    }

    /// Canonical account list.
    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Indexed legs in append order.
    pub fn trades(&self) -> &[IndexedTradeLeg] {
        &self.trades
    }

    /// ABI-encoded `trade(accounts, trades)` call.
    pub fn calldata(&self) -> Bytes {
        crate::abi::encode_trade_call(&self.accounts, &self.trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::TradeKind;
    use alloy::primitives::address;

    const AA: Address = address!("0x00000000000000000000000000000000000000aa");
    const BB: Address = address!("0x00000000000000000000000000000000000000bb");
    const CC: Address = address!("0x00000000000000000000000000000000000000cc");
    const TRADER: Address = address!("0x1111111111111111111111111111111111111111");

    fn leg(maker: Address, taker: Address) -> TradeLeg {
        TradeLeg {
            kind: TradeKind::Liquidation,
            maker,
            taker,
            trader: TRADER,
            data: Bytes::from(vec![maker.0[19], taker.0[19]]),
        }
    }

    #[test]
    fn test_accounts_are_sorted_and_deduplicated() {
        let legs = vec![leg(CC, BB), leg(BB, AA), leg(AA, CC)];
        let index = AccountIndex::from_legs(&legs);

        assert_eq!(index.accounts(), &[AA, BB, CC]);
        assert_eq!(index.position(&BB), Some(1));
        assert_eq!(index.position(&TRADER), None);
    }

    #[test]
    fn test_index_legs_preserves_append_order() {
        let legs = vec![leg(CC, AA), leg(AA, BB)];
        let settlement = Settlement::from_legs(&legs).unwrap();

        assert_eq!(settlement.accounts(), &[AA, BB, CC]);
        let trades = settlement.trades();
        assert_eq!((trades[0].maker_index, trades[0].taker_index), (2, 0));
        assert_eq!((trades[1].maker_index, trades[1].taker_index), (0, 1));
        assert_eq!(trades[0].data, legs[0].data);
    }

    #[test]
    fn test_self_trade_uses_one_account() {
        let settlement = Settlement::from_legs(&[leg(AA, AA)]).unwrap();
        assert_eq!(settlement.accounts(), &[AA]);
        assert_eq!(settlement.trades()[0].maker_index, 0);
        assert_eq!(settlement.trades()[0].taker_index, 0);
    }

    #[test]
    fn test_empty_settlement_is_rejected() {
        assert!(matches!(Settlement::from_legs(&[]), Err(BatchError::EmptyBatch)));
    }

    #[test]
    fn test_unknown_account_is_reported() {
        let index = AccountIndex::from_legs(&[leg(AA, BB)]);
        let err = index.index_legs(&[leg(AA, CC)]).unwrap_err();
        assert!(matches!(err, BatchError::UnindexedAccount { address } if address == CC));
    }
}
