//! Error types for the persistence layer

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A record required by the operation does not exist
    #[error("Record not found: {kind} {key}")]
    NotFound { kind: &'static str, key: String },

    /// A record with the same identity already exists
    #[error("Duplicate record: {kind} {key}")]
    Duplicate { kind: &'static str, key: String },

    /// The backend failed to complete the operation
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            key: key.into(),
        }
    }
}
