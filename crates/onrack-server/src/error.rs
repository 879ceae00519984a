//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use onrack_services::ServiceError;
use onrack_store::StoreError;
use serde::{Deserialize, Serialize};

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Record or relation absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A repository or collaborator call failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Unexpected server fault.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Not-found error for a node identifier.
    pub fn node_not_found(identifier: &str) -> Self {
        Self::NotFound(format!("node {}", identifier))
    }

    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "upstream_failure"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: kind.to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { .. } => ApiError::Conflict(e.to_string()),
            StoreError::InvalidRecord(_) => ApiError::BadRequest(e.to_string()),
            StoreError::Backend(_) => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => ApiError::NotFound(e.to_string()),
            ServiceError::Conflict(_) => ApiError::Conflict(e.to_string()),
            ServiceError::InvalidInput(_) => ApiError::BadRequest(e.to_string()),
            ServiceError::Store(inner) => inner.into(),
            _ => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<onrack_types::TypesError> for ApiError {
    fn from(e: onrack_types::TypesError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}
