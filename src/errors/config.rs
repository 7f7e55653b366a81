//! Configuration errors.

/// Errors that can occur while loading configuration or assembling components
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid private key format: {message}")]
    InvalidPrivateKey { message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
