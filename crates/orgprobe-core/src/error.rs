use std::time::Duration;

use thiserror::Error;

/// Validation errors raised before any network activity happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("organization code should be 8 or 10 chars, instead got {len}")]
    InvalidIdentifierLength { len: usize },

    #[error("date '{value}' does not match {expected}")]
    InvalidDate { value: String, expected: &'static str },

    #[error("invalid endpoint '{value}', expected one of certificates, licenses, companies")]
    InvalidEndpoint { value: String },
}

/// Rejected lookup configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency limit must be greater than zero")]
    ZeroConcurrency,

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

/// Batch-level failures. Per-identifier problems never end up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("batch cancelled before every lookup resolved")]
    Cancelled,

    #[error("batch did not finish within {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
