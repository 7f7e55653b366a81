//! Solidity bindings for the perpetual's batched `trade` entry point.
//!
//! A settlement is a single `trade(address[] accounts, TradeArg[] trades)` call.
//! Each `TradeArg` names its maker and taker by index into `accounts`, the trader
//! contract that interprets `data`, and the trader-specific `data` itself.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use crate::operation::IndexedTradeLeg;

alloy::sol! {
    interface IPerpetualV1 {
        #[derive(Debug, PartialEq, Eq)]
        struct TradeArg {
            uint256 takerIndex;
            uint256 makerIndex;
            address trader;
            bytes data;
        }

        function trade(address[] memory accounts, TradeArg[] memory trades) external;
    }
}

impl From<&IndexedTradeLeg> for IPerpetualV1::TradeArg {
    fn from(leg: &IndexedTradeLeg) -> Self {
        Self {
            takerIndex: U256::from(leg.taker_index),
            makerIndex: U256::from(leg.maker_index),
            trader: leg.trader,
            data: leg.data.clone(),
        }
    }
}

/// ABI-encode the settlement call, selector included.
pub fn encode_trade_call(accounts: &[Address], trades: &[IndexedTradeLeg]) -> Bytes {
    let call = IPerpetualV1::tradeCall {
        accounts: accounts.to_vec(),
        trades: trades.iter().map(IPerpetualV1::TradeArg::from).collect(),
    };
    Bytes::from(call.abi_encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Keccak256};

    #[test]
    fn test_encode_trade_call_selector_and_roundtrip() {
        let accounts = vec![
            address!("0x00000000000000000000000000000000000000aa"),
            address!("0x00000000000000000000000000000000000000bb"),
        ];
        let trades = vec![IndexedTradeLeg {
            maker_index: 0,
            taker_index: 1,
            trader: address!("0x1111111111111111111111111111111111111111"),
            data: Bytes::from(vec![7u8; 64]),
        }];

        let calldata = encode_trade_call(&accounts, &trades);

        let mut hasher = Keccak256::new();
        hasher.update("trade(address[],(uint256,uint256,address,bytes)[])".as_bytes());
        let expected_selector = &hasher.finalize()[..4];
        assert_eq!(&calldata[..4], expected_selector);

        let decoded = IPerpetualV1::tradeCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.accounts, accounts);
        assert_eq!(decoded.trades.len(), 1);
        assert_eq!(decoded.trades[0].makerIndex, U256::ZERO);
        assert_eq!(decoded.trades[0].takerIndex, U256::from(1));
        assert_eq!(decoded.trades[0].data, trades[0].data);
    }
}
