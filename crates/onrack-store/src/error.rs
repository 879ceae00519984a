//! Error types for the inventory stores.

use thiserror::Error;

/// Errors raised by repository implementations.
///
/// A missing record is never an error; lookups return `None` instead.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record with the same key already exists.
    #[error("{kind} already exists: {id}")]
    Conflict {
        /// Record kind.
        kind: &'static str,
        /// Conflicting key.
        id: String,
    },

    /// The record failed validation.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] onrack_types::TypesError),

    /// The backing store could not be reached or failed.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Creates a conflict error.
    pub fn conflict(kind: &'static str, id: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            id: id.into(),
        }
    }
}
