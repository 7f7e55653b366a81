//! Property-based tests for settlement account canonicalization
//!
//! The account list and the indices into it are what the perpetual uses to resolve
//! every maker and taker, so these properties must hold for any mix of legs.

use alloy::primitives::{Address, Bytes};
use perpetual_trade_batch::operation::{Settlement, TradeKind, TradeLeg};
use perpetual_trade_batch::utils::lower_hex;
use proptest::prelude::*;

/// Addresses drawn either from a small pool (to force repeats) or at random
fn address_strategy() -> impl Strategy<Value = Address> {
    prop_oneof![
        (0u8..6).prop_map(Address::with_last_byte),
        any::<[u8; 20]>().prop_map(Address::from),
    ]
}

fn leg_strategy() -> impl Strategy<Value = TradeLeg> {
    (
        prop_oneof![
            Just(TradeKind::Fill),
            Just(TradeKind::Liquidation),
            Just(TradeKind::Deleverage),
        ],
        address_strategy(),
        address_strategy(),
        any::<[u8; 20]>().prop_map(Address::from),
        prop::collection::vec(any::<u8>(), 0..8),
    )
        .prop_map(|(kind, maker, taker, trader, data)| TradeLeg {
            kind,
            maker,
            taker,
            trader,
            data: Bytes::from(data),
        })
}

proptest! {
    #[test]
    fn accounts_are_strictly_ascending_by_lowercase_hex(legs in prop::collection::vec(leg_strategy(), 1..16)) {
        let settlement = Settlement::from_legs(&legs).unwrap();
        let hex: Vec<String> = settlement.accounts().iter().map(lower_hex).collect();

        for pair in hex.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn accounts_are_exactly_the_referenced_makers_and_takers(legs in prop::collection::vec(leg_strategy(), 1..16)) {
        let settlement = Settlement::from_legs(&legs).unwrap();

        for account in settlement.accounts() {
            prop_assert!(legs.iter().any(|leg| leg.maker == *account || leg.taker == *account));
        }
        for leg in &legs {
            prop_assert!(settlement.accounts().contains(&leg.maker));
            prop_assert!(settlement.accounts().contains(&leg.taker));
        }
    }

    #[test]
    fn indices_resolve_to_original_parties(legs in prop::collection::vec(leg_strategy(), 1..16)) {
        let settlement = Settlement::from_legs(&legs).unwrap();
        prop_assert_eq!(settlement.trades().len(), legs.len());

        for (leg, indexed) in legs.iter().zip(settlement.trades()) {
            prop_assert_eq!(settlement.accounts()[indexed.maker_index], leg.maker);
            prop_assert_eq!(settlement.accounts()[indexed.taker_index], leg.taker);
            prop_assert_eq!(indexed.trader, leg.trader);
            prop_assert_eq!(&indexed.data, &leg.data);
        }
    }

    #[test]
    fn account_list_ignores_append_order(
        legs in prop::collection::vec(leg_strategy(), 1..16),
        rotation in 0usize..16,
    ) {
        let mut rotated = legs.clone();
        let len = rotated.len();
        rotated.rotate_left(rotation % len);
        rotated.reverse();

        let original = Settlement::from_legs(&legs).unwrap();
        let reordered = Settlement::from_legs(&rotated).unwrap();
        prop_assert_eq!(original.accounts(), reordered.accounts());
    }
}
