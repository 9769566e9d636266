//! Gemini HTTP client.

use reqwest::Client;

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};

/// Gemini API client.
///
/// One instance drives the whole exchange for a recording: resumable
/// upload, state polling and minutes generation. The operations live in
/// the `upload`, `poll`, `files` and `generate` modules.
pub struct GeminiClient {
    pub(crate) http: Client,
    pub(crate) config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GeminiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// The active configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Build a keyed URL under the service base.
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}{}?key={}",
            self.config.base_url, path, self.config.api_key
        )
    }
}
