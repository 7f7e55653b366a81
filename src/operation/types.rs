//! Core types for trade operations.
//!
//! - Trade kinds and the legs a caller appends
//! - Indexed legs as they appear in the settlement call
//! - The open/committed state of an operation

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-protocol a trade leg belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    Fill,
    Liquidation,
    Deleverage,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeKind::Fill => "fill",
            TradeKind::Liquidation => "liquidation",
            TradeKind::Deleverage => "deleverage",
        };
        f.write_str(name)
    }
}

/// A trade leg as appended, before accounts are indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeLeg {
    pub kind: TradeKind,
    pub maker: Address,
    pub taker: Address,
    /// Trader contract that interprets `data`
    pub trader: Address,
    pub data: Bytes,
}

/// A trade leg whose maker and taker are positions in the settlement account list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedTradeLeg {
    pub maker_index: usize,
    pub taker_index: usize,
    pub trader: Address,
    pub data: Bytes,
}

/// Commit-lock state of a trade operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// Legs may be appended and a commit may be attempted.
    Open,
    /// A non-simulated submission is in flight or has succeeded.
    Committed,
}
