//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("Pacing delay exceeds maximum allowed (60000 ms)")]
    PacingDelayTooLong,

    #[error("Fallback message cannot be empty")]
    EmptyFallbackMessage,

    #[error("Data directory cannot be empty")]
    EmptyDataDir,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
