//! Runtime error types

use thiserror::Error;

/// Pipeline runtime error
#[derive(Error, Debug)]
pub enum EngineError {
    /// Domain-level violation (illegal status transition, bad value)
    #[error("Core error: {0}")]
    Core(#[from] cheqflow_core::CoreError),

    /// Persistence failure on a core state write
    #[error("Store error: {0}")]
    Store(#[from] cheqflow_repository::StoreError),

    /// Field extraction did not produce a usable field set
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// An external scoring service could not be reached or answered badly
    #[error("Collaborator {service} unavailable: {reason}")]
    Collaborator { service: String, reason: String },

    /// Operation referenced a cheque the store does not know
    #[error("Unknown cheque: {0}")]
    UnknownCheque(String),

    /// Operation referenced an account the store does not know
    #[error("Unknown account: {0}")]
    UnknownAccount(String),
}

impl EngineError {
    pub fn collaborator(service: impl Into<String>, reason: impl ToString) -> Self {
        EngineError::Collaborator {
            service: service.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, EngineError>;
