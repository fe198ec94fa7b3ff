//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Durable Error Enum ==
/// Failure reported by a durable store adapter.
///
/// These never reach callers of the cache manager; they are logged and
/// counted, and the manager degrades to fast-tier-only behaviour.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurableError {
    /// Backing store could not be reached or refused the call
    #[error("Durable store unavailable: {0}")]
    Unavailable(String),

    /// Backing store does not implement the operation
    #[error("Durable store does not support {0}")]
    Unsupported(&'static str),
}

// == Cache Error Enum ==
/// Unified error type for caller-facing cache errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in either tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid key, TTL, value or configuration
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Value could not be encoded for storage
    #[error("Serialization failed: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
