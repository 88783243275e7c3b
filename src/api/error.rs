//! HTTP error mapping for domain errors.
//!
//! Inventory and equipment endpoints answer `{message, kind}`; lending
//! endpoints answer `{success: false, message, kind}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::DomainError;

/// Result alias for inventory and equipment handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Result alias for lending handlers
pub type LendingResult<T> = Result<T, LendingError>;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DomainError);

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct LendingError(#[from] pub DomainError);

fn status_of(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        // Conflicts (copy not available, duplicate code) are reported as 400
        DomainError::Validation(_) | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Database(msg) | DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_of(error: &DomainError) -> String {
    match error {
        DomainError::NotFound(msg)
        | DomainError::Validation(msg)
        | DomainError::Conflict(msg)
        | DomainError::Unauthorized(msg)
        | DomainError::Database(msg)
        | DomainError::Internal(msg) => msg.clone(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "message": message_of(&self.0),
            "kind": self.0.kind(),
        });
        (status_of(&self.0), Json(body)).into_response()
    }
}

impl IntoResponse for LendingError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "message": message_of(&self.0),
            "kind": self.0.kind(),
        });
        (status_of(&self.0), Json(body)).into_response()
    }
}
