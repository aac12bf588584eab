//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::archive::ArchiveError;

/// Error returned by API handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown paper id or empty selection.
    #[error("{0}")]
    NotFound(String),

    /// Invalid caller input, rejected before any network activity.
    #[error("{0}")]
    BadRequest(String),

    /// Archive assembly failed.
    #[error("failed to build archive: {0}")]
    Archive(#[from] ArchiveError),
}

impl ApiError {
    /// Creates a 404 error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates a 400 error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_message_is_passed_through() {
        let error = ApiError::bad_request("Maximum 100 papers per download");
        assert_eq!(error.to_string(), "Maximum 100 papers per download");
    }

    #[test]
    fn test_api_error_into_response_status() {
        let response = ApiError::not_found("Paper not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
