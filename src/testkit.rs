//! In-memory collaborators for exercising trade operations without a node.
//!
//! Enabled for this crate's own tests and for dependants through the `testkit`
//! feature.

use crate::errors::SubmissionError;
use crate::operation::IndexedTradeLeg;
use crate::submission::{SendOptions, SettlementSubmitter, SubmissionResult, TxResult};
use alloy::primitives::{keccak256, Address, Bytes};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One call received by a [`RecordingSubmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub accounts: Vec<Address>,
    pub trades: Vec<IndexedTradeLeg>,
    pub options: Option<SendOptions>,
}

impl RecordedSubmission {
    /// Calldata the submission would have carried.
    pub fn calldata(&self) -> Bytes {
        crate::abi::encode_trade_call(&self.accounts, &self.trades)
    }
}

/// Submitter that records every call and answers without touching the network.
///
/// Simulations return empty return data; everything else reports the call as sent
/// with the keccak hash of its calldata. Failures queued with
/// [`fail_next`](Self::fail_next) are returned in order before any success.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    calls: Mutex<Vec<RecordedSubmission>>,
    failures: Mutex<VecDeque<SubmissionError>>,
    gate: Option<Arc<Notify>>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A submitter whose calls block until the returned gate is notified.
    ///
    /// Each `notify_one` releases one pending submission. The call is recorded
    /// before it blocks.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let submitter = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (submitter, gate)
    }

    /// Make the next submission fail with `error`.
    pub fn fail_next(&self, error: SubmissionError) {
        lock(&self.failures).push_back(error);
    }

    pub fn calls(&self) -> Vec<RecordedSubmission> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn last_call(&self) -> Option<RecordedSubmission> {
        lock(&self.calls).last().cloned()
    }
}

#[async_trait]
impl SettlementSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        accounts: &[Address],
        trades: &[IndexedTradeLeg],
        options: Option<&SendOptions>,
    ) -> SubmissionResult<TxResult> {
        let call = RecordedSubmission {
            accounts: accounts.to_vec(),
            trades: trades.to_vec(),
            options: options.cloned(),
        };
        let calldata = call.calldata();
        lock(&self.calls).push(call);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if let Some(error) = lock(&self.failures).pop_front() {
            return Err(error);
        }

        if options.is_some_and(SendOptions::is_simulation) {
            return Ok(TxResult::Simulated {
                return_data: Bytes::new(),
            });
        }
        Ok(TxResult::Sent {
            transaction_hash: keccak256(&calldata),
        })
    }
}

// A panicking test must not poison every later assertion on the recorder.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
