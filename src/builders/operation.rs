//! Builder pattern for TradeOperation

use crate::config::{ContractAddresses, TradeConfig};
use crate::encoding::{AbiTradeDataEncoder, TradeDataEncoder};
use crate::errors::{ConfigError, Result};
use crate::operation::TradeOperation;
use crate::submission::{RpcSubmitter, SettlementSubmitter};
use std::sync::Arc;

/// Builder for creating TradeOperation instances with a fluent API
///
/// Contract addresses and a submitter are required. The encoder defaults to
/// [`AbiTradeDataEncoder`]. The builder is cheap to clone, so one configured
/// builder can start any number of independent operations.
#[derive(Clone, Default)]
pub struct TradeOperationBuilder {
    contracts: Option<ContractAddresses>,
    encoder: Option<Arc<dyn TradeDataEncoder>>,
    submitter: Option<Arc<dyn SettlementSubmitter>>,
}

impl TradeOperationBuilder {
    /// Create a new TradeOperationBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder wired to an [`RpcSubmitter`] for the given configuration
    pub fn from_config(config: &TradeConfig) -> Result<Self> {
        let submitter = RpcSubmitter::from_config(config)?;
        Ok(Self::new()
            .with_contracts(config.contracts)
            .with_submitter(Arc::new(submitter)))
    }

    pub fn with_contracts(mut self, contracts: ContractAddresses) -> Self {
        self.contracts = Some(contracts);
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn TradeDataEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn SettlementSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Build an empty, open TradeOperation
    ///
    /// # Errors
    ///
    /// Returns an error if contract addresses or the submitter were not provided
    pub fn build(self) -> Result<TradeOperation> {
        let contracts = self
            .contracts
            .ok_or(ConfigError::MissingField { field: "contracts" })?;
        let submitter = self
            .submitter
            .ok_or(ConfigError::MissingField { field: "submitter" })?;
        let encoder = self
            .encoder
            .unwrap_or_else(|| Arc::new(AbiTradeDataEncoder::new()));

        Ok(TradeOperation::new(contracts, encoder, submitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TradeError;
    use crate::testkit::RecordingSubmitter;

    #[test]
    fn test_build_requires_contracts_and_submitter() {
        let err = TradeOperationBuilder::new().build().unwrap_err();
        assert!(matches!(
            err,
            TradeError::Config(ConfigError::MissingField { field: "contracts" })
        ));

        let err = TradeOperationBuilder::new()
            .with_contracts(TradeConfig::for_testing().contracts)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TradeError::Config(ConfigError::MissingField { field: "submitter" })
        ));
    }

    #[test]
    fn test_cloned_builder_starts_independent_operations() {
        let builder = TradeOperationBuilder::new()
            .with_contracts(TradeConfig::for_testing().contracts)
            .with_submitter(Arc::new(RecordingSubmitter::new()));

        let first = builder.clone().build().unwrap();
        let second = builder.build().unwrap();
        assert_ne!(first.id(), second.id());
        assert!(first.is_empty() && second.is_empty());
    }

    #[test]
    fn test_from_config_uses_configured_contracts() {
        let config = TradeConfig::for_testing();
        let op = TradeOperationBuilder::from_config(&config).unwrap().build().unwrap();
        assert_eq!(op.contracts(), &config.contracts);
    }
}
