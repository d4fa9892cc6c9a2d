//! Error types for cube operations.

use std::result;
use thiserror::Error;

/// A specialized Result type for cube operations.
pub type Result<T> = result::Result<T, CubeError>;

/// Errors raised by axes, cursors, cubes and the codec.
///
/// Every failure is local and synchronous; nothing is retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CubeError {
    #[error("Unknown category '{category}' on axis '{axis}'")]
    UnknownCategory { axis: String, category: String },

    #[error("Axis '{0}' does not belong to this cube")]
    UnknownAxis(String),

    #[error("Axis '{0}' appears more than once")]
    DuplicateAxis(String),

    #[error("Incomplete coordinate: axis '{axis}' is unset")]
    IncompleteCoordinate { axis: String },

    #[error("No value stored at coordinate {coordinate:?}")]
    NoValueAtCoordinate { coordinate: Vec<String> },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Metadata '{key}' not set for category '{category}' on axis '{axis}'")]
    MetadataNotFound {
        axis: String,
        category: String,
        key: String,
    },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Value kind mismatch: cube stores {expected} values, got {found}")]
    ValueKindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Non-finite number {0} cannot be stored")]
    NonFiniteNumber(f64),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for CubeError {
    fn from(err: serde_json::Error) -> Self {
        CubeError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for CubeError {
    fn from(err: serde_yaml::Error) -> Self {
        CubeError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for CubeError {
    fn from(err: config::ConfigError) -> Self {
        CubeError::Config(err.to_string())
    }
}
