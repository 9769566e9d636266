//! Uploaded-file metadata operations.

use serde::Deserialize;
use tracing::debug;

use crate::client::GeminiClient;
use crate::error::{GeminiError, GeminiResult};

/// Reference to an uploaded file, as returned by the service.
///
/// The handle is only usable for generation once the poller has observed
/// the `ACTIVE` state; the service rejects references to files that are
/// still ingesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    uri: String,
}

impl FileHandle {
    /// Wrap a file URI returned by the service.
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// The full file URI, as embedded in generation requests.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The `files/<id>` resource name used by the metadata endpoint.
    pub fn resource_name(&self) -> GeminiResult<&str> {
        self.uri
            .find("/files/")
            .map(|idx| &self.uri[idx + 1..])
            .ok_or_else(|| {
                GeminiError::invalid_response(format!("file uri has no resource name: {}", self.uri))
            })
    }
}

/// Ingestion state of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    /// Still ingesting; not yet usable
    Processing,
    /// Ingestion complete; usable for generation
    Active,
    /// Ingestion failed; never becomes usable
    Failed,
    /// A state this client does not know; treated as terminal failure
    Other(String),
}

impl FileState {
    fn parse(raw: &str) -> Self {
        match raw {
            "PROCESSING" => Self::Processing,
            "ACTIVE" => Self::Active,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileMetadata {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileMetadata>,
}

impl GeminiClient {
    /// Fetch the current ingestion state of an uploaded file.
    pub async fn file_state(&self, handle: &FileHandle) -> GeminiResult<FileState> {
        let url = self.url(&format!("/v1beta/{}", handle.resource_name()?));
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::from_http_status(status, body, None));
        }

        let meta: FileMetadata = response.json().await?;
        let state = meta
            .state
            .ok_or_else(|| GeminiError::invalid_response("file metadata has no state field"))?;

        debug!(state = %state, "Polled file state");
        Ok(FileState::parse(&state))
    }

    /// Best-effort recovery of a file handle by display name.
    ///
    /// Some finalize responses omit the file object; the listing endpoint
    /// returns newest first, so the first name match is the upload that
    /// just finished. Racy when two uploads share a display name.
    pub async fn find_by_display_name(&self, display_name: &str) -> GeminiResult<FileHandle> {
        let url = self.url("/v1beta/files");
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::from_http_status(status, body, None));
        }

        let listing: FileList = response.json().await?;

        let matched = listing
            .files
            .iter()
            .find(|f| f.display_name.as_deref() == Some(display_name))
            .or_else(|| listing.files.first());

        matched
            .and_then(|f| f.uri.clone())
            .map(FileHandle::new)
            .ok_or_else(|| {
                GeminiError::invalid_response(format!(
                    "upload finished but no file named {:?} could be recovered from the listing",
                    display_name
                ))
            })
    }
}
