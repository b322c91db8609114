//! Error types for the garden snapshot state.

use thiserror::Error;

/// Result type alias for snapshot state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while loading snapshot documents.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read snapshot document: {0}")]
    Read(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),
}
