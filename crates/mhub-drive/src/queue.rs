//! Recording queue on top of a Drive folder.
//!
//! The input folder is the queue; processed and quarantined recordings are
//! renamed with a marker and moved out, which is what keeps them from
//! being selected again. A unit that fails mid-pipeline is left untouched
//! so the next invocation retries it from scratch.

use async_trait::async_trait;
use tracing::{info, warn};

use mhub_gemini::{ChunkSource, ChunkSourceError};
use mhub_models::{QueuedRecording, OVERSIZE_MARKER, PROCESSED_MARKER};

use crate::client::DriveClient;
use crate::error::DriveResult;

/// Scan/mark operations for the recording queue.
pub struct RecordingQueue {
    drive: DriveClient,
    input_folder_id: String,
    archive_folder_id: String,
    oversize_folder_id: String,
}

impl RecordingQueue {
    pub fn new(
        drive: DriveClient,
        input_folder_id: impl Into<String>,
        archive_folder_id: impl Into<String>,
        oversize_folder_id: impl Into<String>,
    ) -> Self {
        Self {
            drive,
            input_folder_id: input_folder_id.into(),
            archive_folder_id: archive_folder_id.into(),
            oversize_folder_id: oversize_folder_id.into(),
        }
    }

    /// The underlying Drive client, for range reads during upload.
    pub fn drive(&self) -> &DriveClient {
        &self.drive
    }

    /// Pick the next eligible recording, if any.
    ///
    /// Listing order is whatever the service returns; at one unit per
    /// invocation every queued recording is reached eventually.
    pub async fn next_candidate(&self) -> DriveResult<Option<QueuedRecording>> {
        let files = self.drive.list_folder(&self.input_folder_id).await?;

        for file in files {
            let recording = file.into_recording();
            if recording.is_eligible() {
                info!(file = %recording.name, size_bytes = recording.size_bytes, "Selected recording");
                return Ok(Some(recording));
            }
        }

        Ok(None)
    }

    /// Move an oversized recording aside so it never re-enters the queue.
    pub async fn quarantine(&self, recording: &QueuedRecording) -> DriveResult<()> {
        warn!(
            file = %recording.name,
            size_mb = recording.size_bytes / (1024 * 1024),
            "Recording exceeds the size cap, quarantining"
        );

        let marked = format!("{}{}", OVERSIZE_MARKER, recording.name);
        self.drive.rename(recording.id.as_str(), &marked).await?;
        self.drive
            .move_file(
                recording.id.as_str(),
                &self.oversize_folder_id,
                &self.input_folder_id,
            )
            .await
    }

    /// Archive a fully processed recording.
    ///
    /// Creates a dedicated subfolder under the archive root, moves the
    /// recording into it, then applies the processed marker.
    pub async fn archive(
        &self,
        recording: &QueuedRecording,
        folder_name: &str,
    ) -> DriveResult<()> {
        let folder_id = self
            .drive
            .create_folder(&self.archive_folder_id, folder_name)
            .await?;

        self.drive
            .move_file(recording.id.as_str(), &folder_id, &self.input_folder_id)
            .await?;

        let marked = format!("{}{}", PROCESSED_MARKER, recording.name);
        self.drive.rename(recording.id.as_str(), &marked).await?;

        info!(file = %recording.name, folder = %folder_name, "Archived recording");
        Ok(())
    }
}

/// Range-addressed reads of one recording, feeding the resumable upload.
pub struct DriveChunkSource<'a> {
    drive: &'a DriveClient,
    file_id: String,
}

impl<'a> DriveChunkSource<'a> {
    pub fn new(drive: &'a DriveClient, file_id: impl Into<String>) -> Self {
        Self {
            drive,
            file_id: file_id.into(),
        }
    }
}

#[async_trait]
impl ChunkSource for DriveChunkSource<'_> {
    async fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>, ChunkSourceError> {
        self.drive
            .read_range(&self.file_id, offset, len)
            .await
            .map_err(|e| ChunkSourceError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::DriveConfig;
    use crate::token::StaticTokenProvider;

    use super::*;

    async fn test_queue(server: &MockServer) -> RecordingQueue {
        let config = DriveConfig {
            base_url: server.uri(),
            ..DriveConfig::default()
        };
        let client =
            DriveClient::new(config, Arc::new(StaticTokenProvider::new("test-token"))).unwrap();
        RecordingQueue::new(client, "input", "archive", "oversize")
    }

    #[tokio::test]
    async fn next_candidate_skips_ineligible_files() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": [
                    { "id": "f1", "name": "notes.pdf", "mimeType": "application/pdf", "size": "100" },
                    { "id": "f2", "name": "[processed]old.mp4", "mimeType": "video/mp4", "size": "100" },
                    { "id": "f3", "name": "standup.mp4", "mimeType": "video/mp4", "size": "2048",
                      "description": "ops, Morning standup" }
                ]
            })))
            .mount(&server)
            .await;

        let queue = test_queue(&server).await;
        let recording = queue.next_candidate().await.unwrap().unwrap();

        assert_eq!(recording.id.as_str(), "f3");
        assert_eq!(recording.name, "standup.mp4");
    }

    #[tokio::test]
    async fn next_candidate_returns_none_for_empty_queue() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": [] })))
            .mount(&server)
            .await;

        let queue = test_queue(&server).await;
        assert!(queue.next_candidate().await.unwrap().is_none());
    }
}
