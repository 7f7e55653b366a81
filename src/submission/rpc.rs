//! JSON-RPC settlement submitter.
//!
//! Signs the `trade(accounts, trades)` call with the executor key and talks to a
//! single node over plain JSON-RPC: `eth_call` for simulations,
//! `eth_sendRawTransaction` for broadcasts and `eth_getTransactionReceipt` polling
//! for confirmations.

use crate::config::{GasConfig, TradeConfig};
use crate::errors::{ConfigError, Result, SubmissionError};
use crate::operation::IndexedTradeLeg;
use crate::submission::{ConfirmationType, SendOptions, SettlementSubmitter, SubmissionResult, TxResult};
use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, B256, U64};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Generic JSON-RPC request structure.
#[derive(Serialize, Debug)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: Vec<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &'static str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// Generic JSON-RPC response structure.
#[derive(Deserialize, Debug)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Deserialize, Debug)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// The receipt fields a confirmation needs.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub transaction_hash: B256,
    pub block_number: Option<U64>,
    pub gas_used: U64,
    /// Absent on pre-Byzantium receipts
    pub status: Option<U64>,
}

impl ReceiptSummary {
    pub fn succeeded(&self) -> bool {
        self.status.is_some_and(|status| status == U64::from(1))
    }
}

/// Settlement submitter backed by a JSON-RPC node.
#[derive(Debug)]
pub struct RpcSubmitter {
    http_client: HttpClient,
    rpc_url: String,
    signer: PrivateKeySigner,
    chain_id: u64,
    perpetual: Address,
    gas: GasConfig,
    confirmation_timeout_ms: u64,
    poll_interval: Duration,
    request_id: AtomicU64,
}

impl RpcSubmitter {
    /// Create a submitter from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Trade configuration holding the RPC endpoint, executor key,
    ///   gas defaults and the perpetual address settlements are sent to
    pub fn from_config(config: &TradeConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_millis(config.rpc.timeout_ms))
            .build()
            .map_err(ConfigError::HttpClient)?;

        tracing::debug!(
            rpc_url = %config.rpc.url,
            chain_id = config.chain_id,
            perpetual = %config.contracts.perpetual,
            "RPC submitter created"
        );

        Ok(Self {
            http_client,
            rpc_url: config.rpc.url.clone(),
            signer: config.executor_signer().clone(),
            chain_id: config.chain_id,
            perpetual: config.contracts.perpetual,
            gas: config.gas,
            confirmation_timeout_ms: config.rpc.confirmation_timeout_ms,
            poll_interval: Duration::from_millis(config.rpc.poll_interval_ms),
            request_id: AtomicU64::new(1),
        })
    }

    /// Address settlement transactions are sent from.
    pub fn executor(&self) -> Address {
        self.signer.address()
    }

    /// Build the settlement transaction, falling back to configured gas values.
    pub fn transaction_request(&self, calldata: Bytes, options: &SendOptions) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.signer.address()),
            to: Some(TxKind::Call(self.perpetual)),
            value: options.value,
            chain_id: Some(self.chain_id),
            input: TransactionInput::both(calldata),
            gas: Some(options.gas.unwrap_or(self.gas.gas_limit)),
            max_fee_per_gas: Some(options.max_fee_per_gas.unwrap_or(self.gas.max_fee_per_gas)),
            max_priority_fee_per_gas: Some(
                options
                    .max_priority_fee_per_gas
                    .unwrap_or(self.gas.max_priority_fee_per_gas),
            ),
            nonce: options.nonce,
            ..Default::default()
        }
    }

    /// The dry-run form of a settlement request.
    ///
    /// Fee caps are dropped so the node does not check the executor's balance
    /// against `gas * max_fee_per_gas`.
    pub fn call_request(tx_request: &TransactionRequest) -> TransactionRequest {
        TransactionRequest {
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            gas_price: None,
            ..tx_request.clone()
        }
    }

    /// Sign and encode a transaction request.
    fn sign_and_encode_transaction(&self, tx_request: TransactionRequest) -> SubmissionResult<Vec<u8>> {
        let mut typed_tx = tx_request
            .build_typed_tx()
            .map_err(|_| SubmissionError::TransactionBuildFailed {
                reason: "request is missing fields for a typed transaction".to_string(),
            })?;

        let signature = self
            .signer
            .sign_transaction_sync(&mut typed_tx)
            .map_err(|e| SubmissionError::TransactionSigningFailed {
                reason: e.to_string(),
            })?;
        let signed_tx = typed_tx.into_signed(signature);
        let tx_envelope = TxEnvelope::from(signed_tx);

        Ok(tx_envelope.encoded_2718())
    }

    async fn simulate(&self, tx_request: &TransactionRequest) -> SubmissionResult<TxResult> {
        let call = serde_json::to_value(Self::call_request(tx_request))?;
        let return_data: Bytes = self.call_required("eth_call", vec![call, json!("latest")]).await?;

        tracing::info!(
            return_data_len = return_data.len(),
            "Settlement simulation succeeded"
        );
        Ok(TxResult::Simulated { return_data })
    }

    async fn broadcast(&self, mut tx_request: TransactionRequest) -> SubmissionResult<B256> {
        if tx_request.nonce.is_none() {
            let nonce: U64 = self
                .call_required(
                    "eth_getTransactionCount",
                    vec![json!(self.signer.address()), json!("pending")],
                )
                .await?;
            tx_request.nonce = Some(nonce.to::<u64>());
        }

        let nonce = tx_request.nonce;
        let raw = self.sign_and_encode_transaction(tx_request)?;
        let raw_hex = format!("0x{}", hex::encode(raw));

        let transaction_hash: B256 = self
            .call_required("eth_sendRawTransaction", vec![json!(raw_hex)])
            .await?;

        tracing::info!(
            transaction_hash = %transaction_hash,
            nonce = ?nonce,
            "Settlement transaction broadcast"
        );
        Ok(transaction_hash)
    }

    /// Poll for the receipt until it appears or the confirmation timeout elapses.
    async fn wait_for_receipt(&self, transaction_hash: B256) -> SubmissionResult<ReceiptSummary> {
        let poll = async {
            loop {
                match self
                    .call::<ReceiptSummary>("eth_getTransactionReceipt", vec![json!(transaction_hash)])
                    .await
                {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) => {}
                    Err(err) => {
                        if let Some(err) = poll_failure(transaction_hash, err) {
                            return Err(err);
                        }
                    }
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        tokio::time::timeout(Duration::from_millis(self.confirmation_timeout_ms), poll)
            .await
            .map_err(|_| SubmissionError::ConfirmationTimeout {
                transaction_hash,
                timeout_ms: self.confirmation_timeout_ms,
            })?
    }

    async fn confirm(&self, transaction_hash: B256) -> SubmissionResult<TxResult> {
        let receipt = self.wait_for_receipt(transaction_hash).await?;
        let result = confirmed_result(transaction_hash, &receipt);

        match &result {
            Ok(TxResult::Confirmed { block_number, gas_used, .. }) => tracing::info!(
                transaction_hash = %transaction_hash,
                block_number,
                gas_used,
                "Settlement transaction confirmed"
            ),
            Ok(_) => {}
            Err(err) => tracing::error!(
                transaction_hash = %transaction_hash,
                error = %err,
                "Settlement transaction not confirmed"
            ),
        }
        result
    }

    async fn call_required<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> SubmissionResult<R> {
        self.call(method, params)
            .await?
            .ok_or_else(|| SubmissionError::InvalidResponse {
                method: method.to_string(),
                message: "empty result".to_string(),
            })
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> SubmissionResult<Option<R>> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);
        tracing::trace!(method, id, "Sending JSON-RPC request");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await?;

        let response_text = response.text().await?;
        let json_response: JsonRpcResponse<R> =
            serde_json::from_str(&response_text).map_err(|e| SubmissionError::InvalidResponse {
                method: method.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        match json_response.error {
            Some(err) => Err(SubmissionError::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            }),
            None => Ok(json_response.result),
        }
    }
}

/// Turn a mined receipt into the confirmation result.
///
/// A missing status counts as a failure: the call cannot be shown to have applied.
fn confirmed_result(transaction_hash: B256, receipt: &ReceiptSummary) -> SubmissionResult<TxResult> {
    if !receipt.succeeded() {
        return Err(SubmissionError::Reverted { transaction_hash });
    }

    let block_number = receipt
        .block_number
        .map(|number| number.to::<u64>())
        .ok_or_else(|| SubmissionError::ReceiptUnavailable {
            transaction_hash,
            reason: "receipt has no block number".to_string(),
        })?;

    Ok(TxResult::Confirmed {
        transaction_hash,
        block_number,
        gas_used: receipt.gas_used.to::<u64>(),
    })
}

/// Decide whether a failed receipt poll ends confirmation.
///
/// Transport errors are retried (`None`); anything else means the node cannot
/// report on the transaction.
fn poll_failure(transaction_hash: B256, err: SubmissionError) -> Option<SubmissionError> {
    match err {
        SubmissionError::Network(e) => {
            tracing::warn!(
                transaction_hash = %transaction_hash,
                error = %e,
                "Receipt poll failed, retrying"
            );
            None
        }
        other => Some(SubmissionError::ReceiptUnavailable {
            transaction_hash,
            reason: other.to_string(),
        }),
    }
}

#[async_trait]
impl SettlementSubmitter for RpcSubmitter {
    async fn submit(
        &self,
        accounts: &[Address],
        trades: &[IndexedTradeLeg],
        options: Option<&SendOptions>,
    ) -> SubmissionResult<TxResult> {
        let options = options.cloned().unwrap_or_default();
        let calldata = crate::abi::encode_trade_call(accounts, trades);
        let tx_request = self.transaction_request(calldata, &options);

        tracing::debug!(
            accounts = accounts.len(),
            trades = trades.len(),
            confirmation = ?options.confirmation,
            "Submitting settlement"
        );

        match options.confirmation {
            ConfirmationType::Simulate => self.simulate(&tx_request).await,
            ConfirmationType::Hash => {
                let transaction_hash = self.broadcast(tx_request).await?;
                Ok(TxResult::Sent { transaction_hash })
            }
            ConfirmationType::Confirmed | ConfirmationType::Both => {
                let transaction_hash = self.broadcast(tx_request).await?;
                self.confirm(transaction_hash).await
            }
        }
    }
}
