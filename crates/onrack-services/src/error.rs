//! Error types for the external collaborators.

use thiserror::Error;

/// Errors that can occur in task-graph, OBM, messaging or file-store calls.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request was malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An OBM driver failed or is not registered.
    #[error("OBM driver {service} failed: {message}")]
    Driver {
        /// Driver service name.
        service: String,
        /// Failure description.
        message: String,
    },

    /// The service has not been started or was stopped.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Underlying store failure.
    #[error("Store error: {0}")]
    Store(#[from] onrack_store::StoreError),

    /// Serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for collaborator calls.
pub type Result<T> = std::result::Result<T, ServiceError>;
