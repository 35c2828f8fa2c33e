//! Error types for the remote data backend.

use thiserror::Error;

use crate::cache::Retryable;

/// Errors from calling the Apps Script backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("Request for {operation} failed: {source}")]
    Request {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("Backend returned HTTP {status} for {operation}")]
    Status { operation: String, status: u16 },

    /// The backend answered with a JSON `error` field.
    #[error("Backend reported an error for {operation}: {message}")]
    Upstream {
        operation: String,
        message: String,
        details: Option<String>,
    },

    /// The response body was not the expected JSON.
    #[error("Invalid response for {operation}: {reason}")]
    Decode { operation: String, reason: String },

    /// No operation has this endpoint name.
    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    /// A required query parameter is missing or blank.
    #[error("Operation '{operation}' requires the '{parameter}' parameter")]
    MissingParameter {
        operation: &'static str,
        parameter: &'static str,
    },
}

impl BackendError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            BackendError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn is_unknown_operation(&self) -> bool {
        matches!(self, BackendError::UnknownOperation { .. })
    }

    pub fn is_missing_parameter(&self) -> bool {
        matches!(self, BackendError::MissingParameter { .. })
    }

    /// Whether the caller, not the backend, is at fault.
    pub fn is_client_error(&self) -> bool {
        self.is_unknown_operation() || self.is_missing_parameter()
    }

    /// Extra detail suitable for a JSON error body.
    pub fn details(&self) -> String {
        match self {
            BackendError::Upstream {
                details: Some(details),
                ..
            } => details.clone(),
            other => other.to_string(),
        }
    }
}

impl Retryable for BackendError {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}
