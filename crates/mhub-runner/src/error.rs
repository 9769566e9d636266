//! Runner error types.

use thiserror::Error;

pub type RunnerResult<T> = Result<T, RunnerError>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State store error: {0}")]
    StateStore(String),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("Gemini error: {0}")]
    Gemini(#[from] mhub_gemini::GeminiError),

    #[error("Drive error: {0}")]
    Drive(#[from] mhub_drive::DriveError),

    #[error("Notion error: {0}")]
    Notion(#[from] mhub_notion::NotionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RunnerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }
}
