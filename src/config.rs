//! Configuration management for perpetual trade settlement.
//!
//! This module loads and validates everything a settlement needs from the
//! environment: the RPC endpoint, the executor key, static gas settings and the
//! contract addresses trade legs are routed to.

use crate::errors::{ConfigError, Result};
use crate::ConfigResult;
use crate::operation::TradeKind;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

const DEFAULT_CHAIN_ID: u64 = 1;
const DEFAULT_GAS_LIMIT: u64 = 4_000_000;
const DEFAULT_MAX_FEE_PER_GAS: u128 = 50_000_000_000;
const DEFAULT_MAX_PRIORITY_FEE_PER_GAS: u128 = 1_000_000_000;
const DEFAULT_RPC_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Contract addresses a settlement touches.
///
/// Each trade kind is interpreted by a fixed trader contract; the settlement call
/// itself goes to the perpetual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Perpetual contract exposing `trade(address[],TradeArg[])`
    pub perpetual: Address,
    /// Order-book trader used for fills
    pub orders: Address,
    /// Liquidation trader
    pub liquidation: Address,
    /// Deleveraging trader
    pub deleveraging: Address,
}

impl ContractAddresses {
    pub fn new(perpetual: Address, orders: Address, liquidation: Address, deleveraging: Address) -> Self {
        Self {
            perpetual,
            orders,
            liquidation,
            deleveraging,
        }
    }

    /// Trader contract that interprets legs of the given kind.
    pub fn trader(&self, kind: TradeKind) -> Address {
        match kind {
            TradeKind::Fill => self.orders,
            TradeKind::Liquidation => self.liquidation,
            TradeKind::Deleverage => self.deleveraging,
        }
    }
}

/// Configuration for the JSON-RPC endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Node URL settlement calls are sent to
    pub url: String,
    /// Timeout for a single RPC request in milliseconds
    pub timeout_ms: u64,
    /// How long to wait for a receipt before giving up, in milliseconds
    pub confirmation_timeout_ms: u64,
    /// Delay between receipt polls in milliseconds
    pub poll_interval_ms: u64,
}

/// Static gas settings used when a commit does not override them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasConfig {
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            max_fee_per_gas: DEFAULT_MAX_FEE_PER_GAS,
            max_priority_fee_per_gas: DEFAULT_MAX_PRIORITY_FEE_PER_GAS,
        }
    }
}

/// Security configuration for private keys
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Executor private key for signing settlement transactions
    pub executor_key: PrivateKeySigner,
}

/// Main configuration structure for trade settlement
#[derive(Debug, Clone)]
pub struct TradeConfig {
    pub rpc: RpcConfig,
    pub gas: GasConfig,
    pub security: SecurityConfig,
    pub chain_id: u64,
    pub contracts: ContractAddresses,
}

impl TradeConfig {
    /// Create a new configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `PERP_RPC_URL`: JSON-RPC endpoint (http or https)
    /// - `PERP_EXECUTOR_PRIVATE_KEY`: Private key for transaction signing
    /// - `PERP_PERPETUAL_ADDRESS`, `PERP_ORDERS_ADDRESS`,
    ///   `PERP_LIQUIDATION_ADDRESS`, `PERP_DELEVERAGING_ADDRESS`
    ///
    /// ## Optional
    /// - `PERP_CHAIN_ID` (default: 1)
    /// - `PERP_GAS_LIMIT` (default: 4000000)
    /// - `PERP_MAX_FEE_PER_GAS` (default: 50 gwei)
    /// - `PERP_MAX_PRIORITY_FEE_PER_GAS` (default: 1 gwei)
    /// - `PERP_RPC_TIMEOUT_MS` (default: 10000)
    /// - `PERP_CONFIRMATION_TIMEOUT_MS` (default: 120000)
    /// - `PERP_POLL_INTERVAL_MS` (default: 1000)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Private keys or addresses are invalid
    /// - Numeric values fail to parse or are zero where that makes no sense
    pub fn from_env() -> Result<Self> {
        tracing::info!("Loading trade configuration from environment");

        let executor_key_str = env::var("PERP_EXECUTOR_PRIVATE_KEY").map_err(|_| {
            tracing::error!("PERP_EXECUTOR_PRIVATE_KEY environment variable is required but not found");
            ConfigError::MissingField {
                field: "PERP_EXECUTOR_PRIVATE_KEY",
            }
        })?;
        let executor_key =
            Self::parse_and_validate_private_key(&executor_key_str, "PERP_EXECUTOR_PRIVATE_KEY")?;
        tracing::debug!("Executor private key loaded and validated successfully");

        let url = env::var("PERP_RPC_URL").map_err(|_| ConfigError::MissingField {
            field: "PERP_RPC_URL",
        })?;
        Self::validate_rpc_url(&url)?;

        let rpc = RpcConfig {
            url,
            timeout_ms: Self::positive_env("PERP_RPC_TIMEOUT_MS", DEFAULT_RPC_TIMEOUT_MS)?,
            confirmation_timeout_ms: Self::positive_env(
                "PERP_CONFIRMATION_TIMEOUT_MS",
                DEFAULT_CONFIRMATION_TIMEOUT_MS,
            )?,
            poll_interval_ms: Self::positive_env("PERP_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?,
        };
        tracing::debug!(
            timeout_ms = rpc.timeout_ms,
            confirmation_timeout_ms = rpc.confirmation_timeout_ms,
            poll_interval_ms = rpc.poll_interval_ms,
            "RPC configuration loaded"
        );

        let gas = GasConfig {
            gas_limit: Self::positive_env("PERP_GAS_LIMIT", DEFAULT_GAS_LIMIT)?,
            max_fee_per_gas: Self::optional_env("PERP_MAX_FEE_PER_GAS", DEFAULT_MAX_FEE_PER_GAS)?,
            max_priority_fee_per_gas: Self::optional_env(
                "PERP_MAX_PRIORITY_FEE_PER_GAS",
                DEFAULT_MAX_PRIORITY_FEE_PER_GAS,
            )?,
        };
        if gas.max_priority_fee_per_gas > gas.max_fee_per_gas {
            tracing::error!(
                max_fee_per_gas = gas.max_fee_per_gas,
                max_priority_fee_per_gas = gas.max_priority_fee_per_gas,
                "Priority fee exceeds max fee"
            );
            return Err(ConfigError::InvalidValue {
                field: "PERP_MAX_PRIORITY_FEE_PER_GAS",
                reason: "must not exceed PERP_MAX_FEE_PER_GAS".to_string(),
            }
            .into());
        }

        let contracts = ContractAddresses {
            perpetual: Self::required_address("PERP_PERPETUAL_ADDRESS")?,
            orders: Self::required_address("PERP_ORDERS_ADDRESS")?,
            liquidation: Self::required_address("PERP_LIQUIDATION_ADDRESS")?,
            deleveraging: Self::required_address("PERP_DELEVERAGING_ADDRESS")?,
        };
        tracing::debug!(
            perpetual = %contracts.perpetual,
            orders = %contracts.orders,
            liquidation = %contracts.liquidation,
            deleveraging = %contracts.deleveraging,
            "Contract addresses loaded"
        );

        let chain_id = Self::positive_env("PERP_CHAIN_ID", DEFAULT_CHAIN_ID)?;

        let config = Self {
            rpc,
            gas,
            security: SecurityConfig { executor_key },
            chain_id,
            contracts,
        };

        tracing::info!(
            chain_id = config.chain_id,
            executor = %config.executor_signer().address(),
            gas_limit = config.gas.gas_limit,
            "Trade configuration loaded successfully"
        );

        Ok(config)
    }

    /// Create a configuration for testing purposes with a random executor key
    ///
    /// # Security Note
    ///
    /// This method generates random private keys and should only be used for testing.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        use alloy::primitives::address;

        Self {
            rpc: RpcConfig {
                url: "http://127.0.0.1:8545".to_string(),
                timeout_ms: 1_000,
                confirmation_timeout_ms: 2_000,
                poll_interval_ms: 10,
            },
            gas: GasConfig::default(),
            security: SecurityConfig {
                executor_key: PrivateKeySigner::random(),
            },
            chain_id: DEFAULT_CHAIN_ID,
            contracts: ContractAddresses {
                perpetual: address!("0x0000000000000000000000000000000000000101"),
                orders: address!("0x0000000000000000000000000000000000000102"),
                liquidation: address!("0x0000000000000000000000000000000000000103"),
                deleveraging: address!("0x0000000000000000000000000000000000000104"),
            },
        }
    }

    /// Get the executor signer
    pub fn executor_signer(&self) -> &PrivateKeySigner {
        &self.security.executor_key
    }

    /// Parse and validate a private key from a string
    fn parse_and_validate_private_key(key_str: &str, var_name: &str) -> Result<PrivateKeySigner> {
        // Remove 0x prefix if present
        let clean_key = key_str.trim().trim_start_matches("0x");

        if clean_key.len() != 64 {
            return Err(ConfigError::InvalidPrivateKey {
                message: format!("{} must be 64 hex characters (32 bytes)", var_name),
            }
            .into());
        }

        if !clean_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidPrivateKey {
                message: format!("{} contains invalid hex characters", var_name),
            }
            .into());
        }

        PrivateKeySigner::from_str(clean_key).map_err(|e| {
            ConfigError::InvalidPrivateKey {
                message: format!("Failed to parse {}: {}", var_name, e),
            }
            .into()
        })
    }

    /// Read and parse a required address variable
    fn required_address(var_name: &'static str) -> Result<Address> {
        let value = env::var(var_name).map_err(|_| ConfigError::MissingField { field: var_name })?;
        crate::utils::parse_address(&value).map_err(|e| {
            ConfigError::InvalidValue {
                field: var_name,
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Read an optional variable, falling back to `default` when unset
    fn optional_env<T>(var_name: &'static str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(raw) => raw.trim().parse().map_err(|e: T::Err| {
                ConfigError::InvalidValue {
                    field: var_name,
                    reason: e.to_string(),
                }
                .into()
            }),
            Err(_) => Ok(default),
        }
    }

    /// Like `optional_env`, rejecting zero
    fn positive_env(var_name: &'static str, default: u64) -> Result<u64> {
        let value = Self::optional_env(var_name, default)?;
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                field: var_name,
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(value)
    }

    /// Validate the RPC URL
    fn validate_rpc_url(rpc_url: &str) -> ConfigResult<()> {
        let parsed = url::Url::parse(rpc_url).map_err(|e| ConfigError::InvalidValue {
            field: "PERP_RPC_URL",
            reason: format!("invalid URL format {}: {}", rpc_url, e),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ConfigError::InvalidValue {
                field: "PERP_RPC_URL",
                reason: format!("unsupported scheme {}, expected http or https", scheme),
            }),
        }
    }
}
