//! Error types for record validation.

use thiserror::Error;

/// Errors raised while building or validating inventory records.
#[derive(Debug, Error)]
pub enum TypesError {
    /// A MAC address did not have six two-digit hex groups.
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// A record failed to (de)serialize.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    /// A field was present but unusable.
    #[error("invalid field {field}: {message}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, TypesError>;

impl TypesError {
    /// Creates an invalid field error.
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }
}
