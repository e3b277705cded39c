//! Error types for ews-admin
//!
//! Every failure reaches the operator as a JSON envelope:
//! `{"error": {"code": "...", "message": "...", ...}}`. Unexpected failures
//! are logged in full and reported with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

use crate::delivery::DeliveryError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., duplicate group name
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Send could not be completed
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// ews-common error
    #[error("Common error: {0}")]
    Common(#[from] ews_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut extra = Map::new();

        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                internal()
            }
            ApiError::Delivery(err) => {
                let status = err.status_code();
                let code = err.error_code();
                let message = err.to_string();
                extra = err.details();
                (status, code, message)
            }
            ApiError::Common(err) => match err {
                ews_common::Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                ews_common::Error::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
                }
                ews_common::Error::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
                other => {
                    error!("Internal error: {}", other);
                    internal()
                }
            },
        };

        let mut body = Map::new();
        body.insert("code".to_string(), json!(error_code));
        body.insert("message".to_string(), json!(message));
        body.extend(extra);

        (status, Json(json!({ "error": Value::Object(body) }))).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error".to_string(),
    )
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
