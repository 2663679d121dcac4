//! Error types for the Guardian swarm

use thiserror::Error;

/// Result type alias for swarm operations
pub type Result<T> = std::result::Result<T, GuardianError>;

/// Error types for detection, normalization and coordination
///
/// Only `InvalidConfig` is fatal, and only before any cycle runs: detector
/// and scorer failures are recovered locally inside a cycle and degrade
/// that source's contribution instead of propagating.
#[derive(Error, Debug)]
pub enum GuardianError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Scorer error: {message}")]
    Scorer { message: String },

    #[error("Coordination error: {message}")]
    Coordination { message: String },

    #[error("Detector timed out after {timeout_secs}s: {detector}")]
    DetectorTimeout { detector: String, timeout_secs: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Chaindata error: {0}")]
    Chaindata(#[from] guardian_chaindata::ChaindataError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuardianError {
    /// Create an invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a detection error
    pub fn detection<S: Into<String>>(message: S) -> Self {
        Self::Detection {
            message: message.into(),
        }
    }

    /// Create a scorer error
    pub fn scorer<S: Into<String>>(message: S) -> Self {
        Self::Scorer {
            message: message.into(),
        }
    }

    /// Create a coordination error
    pub fn coordination<S: Into<String>>(message: S) -> Self {
        Self::Coordination {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error is fatal at startup rather than recoverable per cycle
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GuardianError::InvalidConfig { .. } | GuardianError::Config(_)
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            GuardianError::InvalidConfig { .. } => "config",
            GuardianError::Config(_) => "config",
            GuardianError::Detection { .. } => "detection",
            GuardianError::Scorer { .. } => "scorer",
            GuardianError::Coordination { .. } => "coordination",
            GuardianError::DetectorTimeout { .. } => "timeout",
            GuardianError::Serialization(_) => "serialization",
            GuardianError::Chaindata(_) => "chaindata",
            GuardianError::Io(_) => "io",
            GuardianError::Internal(_) => "internal",
        }
    }
}
