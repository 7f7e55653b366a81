//! Perpetual Trade Batch Library
//!
//! Builds batched trade settlements for a perpetual futures contract. Order fills,
//! liquidations and deleverages are accumulated into a single operation and settled
//! atomically through one `trade(accounts, trades)` call.
//!
//! # Architecture Overview
//!
//! The library is organized into several key modules:
//!
//! - **`operation`**: The trade operation, its commit lock and settlement derivation
//! - **`encoding`**: Trader-specific data for fills, liquidations and deleverages
//! - **`abi`**: Solidity bindings for the perpetual's `trade` entry point
//! - **`submission`**: The settlement submitter seam and its JSON-RPC implementation
//! - **`config`**: Environment-driven configuration and validation
//! - **`builders`**: Builder patterns for operations and submitters
//! - **`errors`**: Error hierarchy shared by every component
//! - **`utils`**: Address and amount parsing helpers
//!
//! # Core Concepts
//!
//! - **Trade leg**: One maker/taker interaction routed to a trader contract, with
//!   opaque data only that contract interprets
//! - **Settlement**: The canonical account list (sorted, deduplicated) plus every leg
//!   with its maker and taker replaced by positions in that list
//! - **Commit lock**: A non-simulated commit locks the operation before submitting;
//!   a failed submission releases it again
//!
//! # Example
//!
//! ```no_run
//! use perpetual_trade_batch::builders::TradeOperationBuilder;
//! use perpetual_trade_batch::config::TradeConfig;
//! use perpetual_trade_batch::submission::{ConfirmationType, SendOptions};
//! use perpetual_trade_batch::utils::{parse_address, parse_signed_amount};
//!
//! # async fn run() -> perpetual_trade_batch::Result<()> {
//! let config = TradeConfig::from_env()?;
//! let mut operation = TradeOperationBuilder::from_config(&config)?.build()?;
//!
//! operation.append_liquidation(
//!     parse_address("0x00000000000000000000000000000000000000aa")?,
//!     parse_address("0x00000000000000000000000000000000000000bb")?,
//!     parse_signed_amount("1000000")?,
//!     false,
//! )?;
//!
//! let result = operation
//!     .commit(Some(&SendOptions::new(ConfirmationType::Confirmed)))
//!     .await?;
//! println!("{:?}", result.transaction_hash());
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Appends take `&mut self`. `commit` takes `&self` and may race with itself: at most
//! one locking commit is in flight per operation.

pub mod abi;
pub mod builders;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod operation;
pub mod submission;
pub mod utils;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

// Re-export the main Result type and error enum for convenience
pub use errors::{Result, TradeError};

// Re-export the primary entry points
pub use builders::{RpcSubmitterBuilder, TradeOperationBuilder};
pub use operation::{BatchState, TradeOperation};
pub use submission::{ConfirmationType, SendOptions, SettlementSubmitter, TxResult};

// Module-specific result types for better ergonomics
pub type BatchResult<T> = std::result::Result<T, errors::BatchError>;
pub type ConfigResult<T> = std::result::Result<T, errors::ConfigError>;
pub type UtilityResult<T> = std::result::Result<T, errors::UtilityError>;
pub use encoding::EncodingResult;
pub use submission::SubmissionResult;
