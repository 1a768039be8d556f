//! Error types for environment resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout envkit
pub type EnvResult<T> = Result<T, EnvError>;

/// Errors raised by the resolver and the configuration loaders built on it
#[derive(Debug, Error)]
pub enum EnvError {
    /// One or more required keys are absent from the environment
    #[error("missing required environment variables: {}", keys.join(", "))]
    MissingRequired { keys: Vec<String> },

    /// Key is unset or empty
    #[error("environment variable {0} is not set")]
    NotFound(String),

    /// Key is set but the value cannot be converted
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    /// JSON decoding failed
    #[error("failed to decode JSON from {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading a file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is structurally wrong
    #[error("configuration error: {0}")]
    Config(String),
}

impl EnvError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        EnvError::Config(msg.into())
    }

    /// Create an invalid-value error
    pub fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        EnvError::Invalid {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Keys reported missing, if this is a required-key failure
    pub fn missing_keys(&self) -> &[String] {
        match self {
            EnvError::MissingRequired { keys } => keys,
            _ => &[],
        }
    }
}
