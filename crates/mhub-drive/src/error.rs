//! Drive error types.

use thiserror::Error;

/// Result type for Drive operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Errors that can occur during Drive operations.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriveError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an unsuccessful HTTP status to a typed error.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::AuthError(format!("HTTP {}: {}", status, body.into())),
            404 => Self::NotFound(body.into()),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, body.into())),
        }
    }
}
