//! Error types for the Draft Valuation Engine

use thiserror::Error;

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Errors that can occur while loading records or configuration.
///
/// Data content never produces an error: missing references, thin samples and
/// degenerate inputs are absorbed by the pipeline and reported as skips,
/// fallbacks or empty results.
#[derive(Error, Debug)]
pub enum ValuationError {
    /// I/O errors while reading record files or configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON record decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML configuration decoding errors
    #[error("Configuration parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store failures
    #[error("Record store error: {0}")]
    Store(String),
}

impl ValuationError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new record store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
