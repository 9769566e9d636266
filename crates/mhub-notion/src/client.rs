//! Notion pages API client.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{NotionError, NotionResult};

/// API version header value this client speaks.
const NOTION_VERSION: &str = "2022-06-28";

/// Notion client configuration.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token
    pub api_key: String,
    /// Service base URL (overridable for test servers)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl NotionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.notion.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> NotionResult<Self> {
        let api_key = std::env::var("NOTION_API_KEY")
            .map_err(|_| NotionError::config("NOTION_API_KEY not set"))?;

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("NOTION_BASE_URL") {
            config.base_url = url;
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

/// Notion REST API client.
pub struct NotionClient {
    http: Client,
    config: NotionConfig,
}

impl NotionClient {
    /// Create a new client.
    pub fn new(config: NotionConfig) -> NotionResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NotionError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> NotionResult<Self> {
        Self::new(NotionConfig::from_env()?)
    }

    /// Create a page in a database, returning the new page's id.
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> NotionResult<String> {
        let url = format!("{}/v1/pages", self.config.base_url);
        let body = serde_json::json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotionError::request_failed(format!(
                "page creation returned {}: {}",
                status, body
            )));
        }

        let created: CreatedPage = response.json().await?;
        debug!(page_id = %created.id, database = %database_id, "Created page");
        Ok(created.id)
    }
}
