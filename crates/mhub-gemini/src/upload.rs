//! Resumable chunked upload.
//!
//! The Files API upload protocol is strictly sequential: the server tracks
//! a single expected offset, so chunk n is only sent once chunk n-1 has
//! been acknowledged. Failures on one chunk are retried for that chunk
//! alone; the handshake itself is never retried.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::error::{GeminiError, GeminiResult};
use crate::files::FileHandle;

/// Error produced by a [`ChunkSource`] read.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ChunkSourceError(pub String);

/// Range-addressed byte source feeding a resumable upload.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Read exactly `len` bytes starting at `offset`.
    async fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>, ChunkSourceError>;
}

/// Transient protocol state for one resumable transfer.
///
/// Owned exclusively by the upload loop and discarded once a handle is
/// obtained or the transfer fails.
struct UploadSession {
    endpoint: String,
    total_size: u64,
    offset: u64,
}

impl UploadSession {
    fn new(endpoint: String, total_size: u64) -> Self {
        Self {
            endpoint,
            total_size,
            offset: 0,
        }
    }

    fn complete(&self) -> bool {
        self.offset >= self.total_size
    }

    /// The next chunk to send: (offset, length, is_final).
    fn next_chunk(&self, chunk_size: u64) -> (u64, u64, bool) {
        let len = chunk_size.min(self.total_size - self.offset);
        let is_final = self.offset + len == self.total_size;
        (self.offset, len, is_final)
    }

    fn advance(&mut self, len: u64) {
        self.offset += len;
    }
}

#[derive(Debug, Deserialize)]
struct FinalizeResponse {
    #[serde(default)]
    file: Option<FinalizedFile>,
}

#[derive(Debug, Deserialize)]
struct FinalizedFile {
    #[serde(default)]
    uri: Option<String>,
}

impl GeminiClient {
    /// Upload a media object via the resumable protocol.
    ///
    /// Negotiates an upload session, streams fixed-size chunks in strictly
    /// increasing offset order with bounded per-chunk retry, and returns
    /// the handle embedded in the finalize response. When the finalize
    /// response omits the handle, falls back to a listing search by
    /// display name.
    pub async fn upload(
        &self,
        source: &dyn ChunkSource,
        display_name: &str,
        mime_type: &str,
        total_size: u64,
    ) -> GeminiResult<FileHandle> {
        info!(
            name = %display_name,
            size_mb = total_size as f64 / (1024.0 * 1024.0),
            "Starting resumable upload"
        );

        let endpoint = self
            .negotiate_session(display_name, mime_type, total_size)
            .await?;

        let mut session = UploadSession::new(endpoint, total_size);
        let mut file_uri: Option<String> = None;

        while !session.complete() {
            let (offset, len, is_final) = session.next_chunk(self.config.chunk_size);

            let chunk = source
                .read_range(offset, len)
                .await
                .map_err(|e| GeminiError::source(e.to_string()))?;

            let terminal = self.send_chunk(&session.endpoint, &chunk, offset, is_final).await?;
            if is_final {
                file_uri = terminal;
            }

            session.advance(len);
        }

        match file_uri {
            Some(uri) => {
                info!(uri = %uri, "Upload complete");
                Ok(FileHandle::new(uri))
            }
            None => {
                warn!("Finalize response carried no file reference, querying the listing");
                tokio::time::sleep(self.config.fallback_settle_delay).await;
                self.find_by_display_name(display_name).await
            }
        }
    }

    /// Negotiate the upload session and extract its endpoint.
    ///
    /// A failed handshake is not a transient condition; it fails fast with
    /// no retry.
    async fn negotiate_session(
        &self,
        display_name: &str,
        mime_type: &str,
        total_size: u64,
    ) -> GeminiResult<String> {
        let url = self.url("/upload/v1beta/files");
        let metadata = serde_json::json!({ "file": { "display_name": display_name } });

        let response = self
            .http
            .post(&url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", total_size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| GeminiError::protocol(format!("handshake request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::protocol(format!(
                "handshake returned {}: {}",
                status, body
            )));
        }

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| GeminiError::protocol("handshake response missing x-goog-upload-url"))
    }

    /// Send one chunk, retrying the same chunk on failure.
    ///
    /// Returns the file URI when this was the final chunk and the terminal
    /// response embedded one.
    async fn send_chunk(
        &self,
        endpoint: &str,
        chunk: &[u8],
        offset: u64,
        is_final: bool,
    ) -> GeminiResult<Option<String>> {
        let command = if is_final { "upload, finalize" } else { "upload" };

        let mut attempts = 0u32;
        loop {
            attempts += 1;

            let outcome = self
                .http
                .post(endpoint)
                .header("X-Goog-Upload-Protocol", "resumable")
                .header("X-Goog-Upload-Command", command)
                .header("X-Goog-Upload-Offset", offset.to_string())
                .body(chunk.to_vec())
                .send()
                .await;

            let failure = match outcome {
                Ok(response) if matches!(response.status().as_u16(), 200 | 201 | 308) => {
                    debug!(offset, len = chunk.len(), is_final, "Chunk acknowledged");

                    if !is_final {
                        return Ok(None);
                    }

                    let body: FinalizeResponse = response.json().await.unwrap_or(FinalizeResponse {
                        file: None,
                    });
                    return Ok(body.file.and_then(|f| f.uri));
                }
                Ok(response) => format!("status {}", response.status()),
                Err(e) => format!("transport error: {}", e),
            };

            if attempts >= self.config.chunk_attempt_limit {
                return Err(GeminiError::Transfer {
                    offset,
                    attempts,
                    message: failure,
                });
            }

            warn!(offset, attempt = attempts, failure = %failure, "Chunk upload failed, retrying");
            tokio::time::sleep(self.config.chunk_retry_delay).await;
        }
    }
}
