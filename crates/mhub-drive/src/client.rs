//! Drive v3 REST client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use mhub_models::{QueuedRecording, RecordingId};

use crate::error::{DriveError, DriveResult};
use crate::token::{AccessTokenProvider, GcpTokenProvider};

/// Drive client configuration.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Service base URL (overridable for test servers)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Listing page size
    pub page_size: u32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com".to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(5),
            page_size: 100,
        }
    }
}

/// File entry returned by the listing endpoint.
///
/// Drive serializes `size` as a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DriveFile {
    /// Declared size in bytes; folders and shortcuts report none.
    pub fn size_bytes(&self) -> u64 {
        self.size
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// Convert into the shared queue model.
    pub fn into_recording(self) -> QueuedRecording {
        let size_bytes = self.size_bytes();
        QueuedRecording {
            id: RecordingId::from_string(self.id),
            name: self.name,
            size_bytes,
            mime_type: self.mime_type,
            annotation: self.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Drive v3 REST API client.
pub struct DriveClient {
    http: Client,
    config: DriveConfig,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl DriveClient {
    /// Create a new client with the given token provider.
    pub fn new(config: DriveConfig, tokens: Arc<dyn AccessTokenProvider>) -> DriveResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("mhub-drive/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DriveError::Network)?;

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// Create from environment variables with service-account auth.
    pub fn from_env() -> DriveResult<Self> {
        let mut config = DriveConfig::default();
        if let Ok(url) = std::env::var("DRIVE_BASE_URL") {
            config.base_url = url;
        }
        Self::new(config, Arc::new(GcpTokenProvider::from_env()?))
    }

    async fn bearer(&self) -> DriveResult<String> {
        self.tokens.access_token().await
    }

    /// List non-trashed files directly under a folder.
    pub async fn list_folder(&self, folder_id: &str) -> DriveResult<Vec<DriveFile>> {
        let query = format!("'{}' in parents and trashed = false", folder_id);
        let url = format!(
            "{}/drive/v3/files?q={}&fields=files(id,name,mimeType,size,description)&pageSize={}",
            self.config.base_url,
            urlencoding::encode(&query),
            self.config.page_size
        );

        let token = self.bearer().await?;
        let response = self.http.get(&url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::from_http_status(status, body));
        }

        let listing: FileListResponse = response.json().await?;
        debug!(folder = %folder_id, files = listing.files.len(), "Listed folder");
        Ok(listing.files)
    }

    /// Read a byte range of a file's media content.
    ///
    /// Drive answers ranged reads with 206; small files may come back
    /// whole with 200, which is accepted as-is.
    pub async fn read_range(&self, file_id: &str, offset: u64, len: u64) -> DriveResult<Vec<u8>> {
        let url = format!("{}/drive/v3/files/{}?alt=media", self.config.base_url, file_id);
        let range = format!("bytes={}-{}", offset, offset + len - 1);

        let token = self.bearer().await?;
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::RANGE, range)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 206 && status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::from_http_status(status, body));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Rename a file.
    pub async fn rename(&self, file_id: &str, new_name: &str) -> DriveResult<()> {
        let url = format!("{}/drive/v3/files/{}", self.config.base_url, file_id);
        let body = serde_json::json!({ "name": new_name });

        let token = self.bearer().await?;
        let response = self
            .http
            .patch(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        self.expect_success(response).await
    }

    /// Move a file between folders.
    pub async fn move_file(
        &self,
        file_id: &str,
        add_parent: &str,
        remove_parent: &str,
    ) -> DriveResult<()> {
        let url = format!(
            "{}/drive/v3/files/{}?addParents={}&removeParents={}",
            self.config.base_url, file_id, add_parent, remove_parent
        );

        let token = self.bearer().await?;
        let response = self
            .http
            .patch(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        self.expect_success(response).await
    }

    /// Create a folder under a parent, returning its id.
    pub async fn create_folder(&self, parent_id: &str, name: &str) -> DriveResult<String> {
        let url = format!("{}/drive/v3/files", self.config.base_url);
        let body = serde_json::json!({
            "name": name,
            "mimeType": "application/vnd.google-apps.folder",
            "parents": [parent_id],
        });

        let token = self.bearer().await?;
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::from_http_status(status, body));
        }

        let created: CreatedFile = response.json().await?;
        Ok(created.id)
    }

    async fn expect_success(&self, response: reqwest::Response) -> DriveResult<()> {
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(DriveError::from_http_status(status, body))
    }
}
