//! Gemini client configuration.

use std::time::Duration;

use crate::error::{GeminiError, GeminiResult};

/// Default public endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini client configuration.
///
/// All delays and budgets live here so tests can run with millisecond
/// values while production keeps the reference timings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Model used for generation
    pub model: String,
    /// Service base URL (overridable for test servers)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Resumable upload chunk size in bytes
    pub chunk_size: u64,
    /// Attempts per chunk before the upload is abandoned
    pub chunk_attempt_limit: u32,
    /// Fixed delay between attempts on the same chunk
    pub chunk_retry_delay: Duration,
    /// Settle delay before the listing fallback when the finalize
    /// response carries no file reference
    pub fallback_settle_delay: Duration,
    /// Interval between file-state polls
    pub poll_interval: Duration,
    /// Maximum number of file-state polls
    pub poll_attempt_limit: u32,
    /// Total generation attempts (first call included)
    pub generate_attempt_limit: u32,
    /// Cool-down after a rate-limited generation attempt
    pub rate_limit_cooldown: Duration,
}

impl GeminiConfig {
    /// Create a config with reference timings for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300),
            chunk_size: 8 * 1024 * 1024,
            chunk_attempt_limit: 3,
            chunk_retry_delay: Duration::from_secs(2),
            fallback_settle_delay: Duration::from_secs(3),
            poll_interval: Duration::from_secs(5),
            poll_attempt_limit: 60,
            generate_attempt_limit: 3,
            rate_limit_cooldown: Duration::from_secs(60),
        }
    }

    /// Create config from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; the rest fall back to reference
    /// timings.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::config("GEMINI_API_KEY not set"))?;

        let mut config = Self::new(api_key);

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = url;
        }
        if let Some(mb) = env_u64("GEMINI_CHUNK_MB") {
            config.chunk_size = mb * 1024 * 1024;
        }
        if let Some(secs) = env_u64("GEMINI_POLL_INTERVAL_SECS") {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(n) = env_u64("GEMINI_POLL_ATTEMPTS") {
            config.poll_attempt_limit = n as u32;
        }
        if let Some(secs) = env_u64("GEMINI_COOLDOWN_SECS") {
            config.rate_limit_cooldown = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}
