//! Error type returned by route handlers.
//!
//! Every handled failure renders as `{"error": "<message>"}` with a 4xx or 5xx
//! status. Store errors are logged with their detail and replaced by a
//! generic message before they reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    // ---
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Log a store failure and hide its detail behind `message`.
    pub fn store(err: sqlx::Error, message: &str) -> Self {
        tracing::error!("{}: {}", message, err);
        Self::internal(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_store_error_hides_detail() {
        // ---
        let err = ApiError::store(sqlx::Error::RowNotFound, "Failed to load reports");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to load reports");
    }

    #[test]
    fn test_error_status_codes() {
        // ---
        assert_eq!(ApiError::bad_request("x").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").into_response().status(), StatusCode::NOT_FOUND);
    }
}
