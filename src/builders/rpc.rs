//! Builder pattern for RpcSubmitter

use crate::config::TradeConfig;
use crate::errors::{ConfigError, Result};
use crate::submission::RpcSubmitter;

/// Builder for creating RpcSubmitter instances with a fluent API
pub struct RpcSubmitterBuilder {
    config: Option<TradeConfig>,
}

impl RpcSubmitterBuilder {
    /// Create a new RpcSubmitterBuilder
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Set the trade configuration
    pub fn with_config(mut self, config: TradeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the RpcSubmitter
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration was provided or the HTTP client
    /// cannot be created
    pub fn build(self) -> Result<RpcSubmitter> {
        let config = self
            .config
            .ok_or(ConfigError::MissingField { field: "config" })?;

        RpcSubmitter::from_config(&config)
    }
}

impl Default for RpcSubmitterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
