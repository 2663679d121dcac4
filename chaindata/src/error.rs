//! Error types for the chaindata crate

use thiserror::Error;

/// Result type alias for chaindata operations
pub type Result<T> = std::result::Result<T, ChaindataError>;

/// Error types for snapshot construction and retrieval
#[derive(Error, Debug)]
pub enum ChaindataError {
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },

    #[error("Provider error: {message}")]
    Provider { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChaindataError {
    /// Create a new schema validation error
    pub fn schema_validation<S: Into<String>>(message: S) -> Self {
        Self::SchemaValidation {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ChaindataError::InvalidNetwork(_) => "validation",
            ChaindataError::Serialization(_) => "serialization",
            ChaindataError::Io(_) => "io",
            ChaindataError::SchemaValidation { .. } => "validation",
            ChaindataError::Provider { .. } => "provider",
            ChaindataError::Internal(_) => "internal",
        }
    }
}
