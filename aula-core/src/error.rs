//! Core error types for the Aula client.

use thiserror::Error;

/// Core error type for model construction and parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field was missing from an upstream payload.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Invalid data from an upstream payload.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
