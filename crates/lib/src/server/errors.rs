//! JSON error responses for the API routes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::backend::BackendError;

/// An API failure and the status it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Unauthorized,
    Forbidden,
    NotFound,
    BadRequest(String),
    MethodNotAllowed,
    /// The backend failed after retries. Carries the detail string.
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        if err.is_unknown_operation() {
            ApiError::NotFound
        } else if err.is_missing_parameter() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Upstream(err.details())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Unauthorized => json!({ "error": "Unauthorized" }),
            ApiError::Forbidden => json!({ "error": "Forbidden" }),
            ApiError::NotFound => json!({ "error": "Endpoint not found" }),
            ApiError::BadRequest(message) => json!({ "error": message }),
            ApiError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            ApiError::Upstream(details) => json!({
                "error": "Internal Server Error",
                "details": details,
            }),
        };
        (status, Json(body)).into_response()
    }
}
