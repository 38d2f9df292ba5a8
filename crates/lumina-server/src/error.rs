//! Error types for the ingress API.
//!
//! [`ApiError`] unifies all handler failure modes into a single enum
//! that converts into an Axum HTTP response. Arbitration itself never
//! errors -- policy refusals are ordinary `rejected` events with a 200
//! status; this type covers the transport-level failures around it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the ingress API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Arbitration did not complete within the ingress deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// A persistence operation failed.
    #[error("database error: {0}")]
    Database(#[from] lumina_db::DbError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg.clone()),
            Self::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
