//! Gemini error types.

use thiserror::Error;

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Errors that can occur while talking to the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upload handshake failed: {0}")]
    Protocol(String),

    #[error("Chunk transfer failed at offset {offset} after {attempts} attempts: {message}")]
    Transfer {
        offset: u64,
        attempts: u32,
        message: String,
    },

    #[error("Source read failed: {0}")]
    Source(String),

    #[error("File not ready after {attempts} polls")]
    ReadinessTimeout { attempts: u32 },

    #[error("Remote processing failed: state {0}")]
    ProcessingFailed(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limited by the generation service")]
    RateLimited(Option<u64>),

    #[error("Rate-limit retries exhausted after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeminiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an unsuccessful HTTP status to a typed error.
    ///
    /// 429 becomes the typed rate-limit variant so callers can branch on it
    /// with a match instead of inspecting message text.
    pub fn from_http_status(status: u16, body: impl Into<String>, retry_after_ms: Option<u64>) -> Self {
        match status {
            429 => Self::RateLimited(retry_after_ms),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, body.into())),
        }
    }

    /// Whether the remote signalled its rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Suggested wait from a Retry-After header, if the remote sent one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited(after) => *after,
            _ => None,
        }
    }
}
