//! Readiness polling for uploaded files.

use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::error::{GeminiError, GeminiResult};
use crate::files::{FileHandle, FileState};

impl GeminiClient {
    /// Block until the uploaded file reaches the `ACTIVE` state.
    ///
    /// Polls the metadata endpoint at a fixed interval while the file
    /// reports `PROCESSING`, up to the configured attempt budget. Any
    /// other terminal state, or an exhausted budget, is fatal: a handle
    /// that was never confirmed active must not be used for generation.
    pub async fn await_active(&self, handle: &FileHandle) -> GeminiResult<()> {
        let mut attempts = 0u32;

        loop {
            tokio::time::sleep(self.config.poll_interval).await;
            attempts += 1;

            match self.file_state(handle).await? {
                FileState::Active => {
                    info!(attempts, "File is active");
                    return Ok(());
                }
                FileState::Processing => {
                    debug!(attempts, "File still processing");
                    if attempts >= self.config.poll_attempt_limit {
                        return Err(GeminiError::ReadinessTimeout { attempts });
                    }
                }
                FileState::Failed => {
                    return Err(GeminiError::ProcessingFailed("FAILED".to_string()));
                }
                FileState::Other(state) => {
                    return Err(GeminiError::ProcessingFailed(state));
                }
            }
        }
    }
}
