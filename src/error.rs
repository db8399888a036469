//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the caching layer.
///
/// Variants are `Clone` because a coalesced recompute delivers one outcome to
/// every caller that joined the flight.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The snapshot recompute operation failed
    #[error("recompute failed: {0}")]
    RecomputeFailed(String),

    /// The in-flight recompute was dropped before publishing a result
    #[error("recompute abandoned: {0}")]
    RecomputeAbandoned(String),

    /// The authoritative entity lookup failed (missing record or unreachable store)
    #[error("authoritative lookup failed: {0}")]
    LookupFailed(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::RecomputeFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CacheError::RecomputeAbandoned(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            CacheError::LookupFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;
