//! Kind registry errors

use thiserror::Error;

/// Errors that can occur when converting instances through a kind adapter
#[derive(Debug, Error)]
pub enum KindError {
    /// Instance could not be converted to or from its typed form
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Instance belongs to a different kind than the adapter
    #[error("Kind mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// Kind handled by the adapter
        expected: String,
        /// Kind found on the instance
        actual: String,
    },
}
