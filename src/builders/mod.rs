//! Builder patterns for complex object construction.
//!
//! # Available Builders
//!
//! - **`TradeOperationBuilder`**: Wires contracts, encoder and submitter into a
//!   trade operation
//! - **`RpcSubmitterBuilder`**: Constructs JSON-RPC settlement submitters from
//!   configuration
//!
//! Builders consume themselves on `build` and report missing required parts as
//! [`ConfigError::MissingField`](crate::errors::ConfigError::MissingField).

pub mod operation;
pub mod rpc;

// Re-export builders for convenience
pub use operation::TradeOperationBuilder;
pub use rpc::RpcSubmitterBuilder;
