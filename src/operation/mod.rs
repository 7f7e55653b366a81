//! Batched trade operations against the perpetual.
//!
//! A [`TradeOperation`] accumulates fills, liquidations and deleverages, then
//! commits them as one `trade(accounts, trades)` settlement call:
//!
//! 1. **Accumulate**: each append encodes the leg's trader data and records the
//!    maker, taker and trader contract. Appends take `&mut self` and return the
//!    operation, so legs chain with `?`.
//! 2. **Commit**: the canonical account list and indexed legs are derived from the
//!    current legs and handed to the [`SettlementSubmitter`] in a single call.
//!
//! # Commit lock
//!
//! A commit with explicit, non-simulated [`SendOptions`] locks the operation before
//! the submission is awaited, so a second commit racing the first fails fast with
//! [`BatchError::AlreadyCommitted`]. If the submission fails the lock is released
//! and the operation can be extended or committed again. Simulated commits and
//! commits without options never lock.

pub mod settlement;
pub mod types;

pub use settlement::{AccountIndex, Settlement};
pub use types::{BatchState, IndexedTradeLeg, TradeKind, TradeLeg};

use crate::config::ContractAddresses;
use crate::encoding::{Fill, SignedOrder, TradeDataEncoder};
use crate::errors::{BatchError, Result, SubmissionOutcome};
use crate::submission::{SendOptions, SettlementSubmitter, TxResult};
use alloy::primitives::{Address, Bytes, I256, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Single-use builder for one atomic settlement.
pub struct TradeOperation {
    id: Uuid,
    contracts: ContractAddresses,
    encoder: Arc<dyn TradeDataEncoder>,
    submitter: Arc<dyn SettlementSubmitter>,
    trades: Vec<TradeLeg>,
    committed: AtomicBool,
}

impl TradeOperation {
    /// Create an empty, open operation.
    ///
    /// # Arguments
    ///
    /// * `contracts` - Trader contracts each leg kind is routed to
    /// * `encoder` - Producer of trader-specific leg data
    /// * `submitter` - Collaborator that sends the settlement call
    pub fn new(
        contracts: ContractAddresses,
        encoder: Arc<dyn TradeDataEncoder>,
        submitter: Arc<dyn SettlementSubmitter>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contracts,
            encoder,
            submitter,
            trades: Vec::new(),
            committed: AtomicBool::new(false),
        }
    }

    /// A fresh, empty operation sharing this one's collaborators.
    pub fn reinitiate(&self) -> Self {
        Self::new(self.contracts, Arc::clone(&self.encoder), Arc::clone(&self.submitter))
    }

    /// Fill a signed order at the given amount, price and fee.
    ///
    /// Maker and taker are taken from the order; the leg is routed to the
    /// order-book trader.
    ///
    /// # Errors
    ///
    /// - [`BatchError::AlreadyCommitted`] if the operation is locked
    /// - an encoding error if the order cannot be encoded (nothing is appended)
    pub fn append_fill(
        &mut self,
        order: &SignedOrder,
        amount: U256,
        price: U256,
        fee: I256,
    ) -> Result<&mut Self> {
        self.ensure_open()?;
        let data = self.encoder.fill_trade_data(order, &Fill { amount, price, fee })?;
        self.push_trade(TradeKind::Fill, order.maker(), order.taker(), data);
        Ok(self)
    }

    /// Liquidate `maker`'s position into `taker`.
    ///
    /// A positive `amount` buys for the taker; `all_or_nothing` rejects partial
    /// liquidation on chain.
    pub fn append_liquidation(
        &mut self,
        maker: Address,
        taker: Address,
        amount: I256,
        all_or_nothing: bool,
    ) -> Result<&mut Self> {
        self.ensure_open()?;
        let data = self.encoder.liquidate_trade_data(amount, all_or_nothing)?;
        self.push_trade(TradeKind::Liquidation, maker, taker, data);
        Ok(self)
    }

    /// Deleverage `maker`'s position against `taker`.
    pub fn append_deleverage(
        &mut self,
        maker: Address,
        taker: Address,
        amount: I256,
        all_or_nothing: bool,
    ) -> Result<&mut Self> {
        self.ensure_open()?;
        let data = self.encoder.deleverage_trade_data(amount, all_or_nothing)?;
        self.push_trade(TradeKind::Deleverage, maker, taker, data);
        Ok(self)
    }

    /// Submit every appended leg as one settlement call.
    ///
    /// # Arguments
    ///
    /// * `options` - Submission configuration. Only `Some` non-simulated options
    ///   lock the operation; `None` submits without taking the lock.
    ///
    /// # Errors
    ///
    /// - [`BatchError::AlreadyCommitted`] if the operation is locked, including by a
    ///   concurrent commit whose submission is still pending
    /// - [`BatchError::EmptyBatch`] if no legs were appended
    /// - the submitter's error, unchanged, after the lock has been released
    pub async fn commit(&self, options: Option<&SendOptions>) -> Result<TxResult> {
        self.ensure_open()?;
        if self.trades.is_empty() {
            return Err(BatchError::EmptyBatch.into());
        }

        let locks = options.is_some_and(|opts| !opts.is_simulation());
        let settlement = Settlement::from_legs(&self.trades)?;

        if locks && self.committed.swap(true, Ordering::AcqRel) {
            return Err(BatchError::AlreadyCommitted.into());
        }

        tracing::info!(
            batch_id = %self.id,
            trade_count = settlement.trades().len(),
            account_count = settlement.accounts().len(),
            confirmation = ?options.map(|opts| opts.confirmation),
            locked = locks,
            "Committing trade operation"
        );
        tracing::debug!(
            batch_id = %self.id,
            accounts = ?settlement.accounts(),
            "Settlement accounts derived"
        );

        match self
            .submitter
            .submit(settlement.accounts(), settlement.trades(), options)
            .await
        {
            Ok(result) => {
                tracing::info!(
                    batch_id = %self.id,
                    transaction_hash = ?result.transaction_hash(),
                    "Trade operation submitted"
                );
                Ok(result)
            }
            Err(err) => {
                let outcome = err.outcome();
                tracing::error!(
                    batch_id = %self.id,
                    error = %err,
                    outcome = ?outcome,
                    "Trade operation submission failed"
                );

                if locks {
                    self.committed.store(false, Ordering::Release);
                    match outcome {
                        SubmissionOutcome::NotApplied => tracing::warn!(
                            batch_id = %self.id,
                            "Commit lock released after failed submission"
                        ),
                        SubmissionOutcome::Unknown => tracing::warn!(
                            batch_id = %self.id,
                            "Commit lock released although the settlement may still land"
                        ),
                    }
                }

                Err(err.into())
            }
        }
    }

    /// Derive the settlement a commit would submit right now, without locking.
    pub fn settlement(&self) -> Result<Settlement> {
        Ok(Settlement::from_legs(&self.trades)?)
    }

    /// Identifier used to correlate this operation's log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> BatchState {
        if self.is_committed() {
            BatchState::Committed
        } else {
            BatchState::Open
        }
    }

    pub fn is_committed(&self) -> bool {
        self.committed.load(Ordering::Acquire)
    }

    /// Legs in append order.
    pub fn trades(&self) -> &[TradeLeg] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_committed() {
            return Err(BatchError::AlreadyCommitted.into());
        }
        Ok(())
    }

    fn push_trade(&mut self, kind: TradeKind, maker: Address, taker: Address, data: Bytes) {
        let trader = self.contracts.trader(kind);
        tracing::debug!(
            batch_id = %self.id,
            kind = %kind,
            maker = %maker,
            taker = %taker,
            trader = %trader,
            "Trade appended"
        );
        self.trades.push(TradeLeg {
            kind,
            maker,
            taker,
            trader,
            data,
        });
    }
}

impl std::fmt::Debug for TradeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeOperation")
            .field("id", &self.id)
            .field("contracts", &self.contracts)
            .field("trades", &self.trades)
            .field("state", &self.state())
            .finish()
    }
}
