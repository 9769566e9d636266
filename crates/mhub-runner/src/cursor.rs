//! Durable sequence cursor.
//!
//! The cursor is the system's only durable state: the last sequence number
//! assigned to a fully committed meeting. It is read once per invocation
//! and persisted only after the record store has accepted the result, so a
//! crash mid-unit never advances it and the number is safely reused when
//! the unit is retried.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use mhub_models::MeetingSeq;

use crate::error::{RunnerError, RunnerResult};

/// Key under which the cursor lives in the property store.
const CURSOR_KEY: &str = "last_meeting_seq";

/// Durable store of named string values.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn get(&self, key: &str) -> RunnerResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> RunnerResult<()>;
}

/// JSON-file-backed property store.
///
/// Writes go to a sibling temp file first and land via rename, so a kill
/// mid-write leaves the previous state intact. Single-writer by design;
/// invocation serialization is the external scheduler's job.
pub struct JsonPropertyStore {
    path: PathBuf,
}

impl JsonPropertyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> RunnerResult<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                RunnerError::state_store(format!(
                    "state file {} is corrupt: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(RunnerError::Io(e)),
        }
    }

    fn persist(&self, values: &HashMap<String, String>) -> RunnerResult<()> {
        let tmp = temp_path(&self.path);
        std::fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl PropertyStore for JsonPropertyStore {
    async fn get(&self, key: &str) -> RunnerResult<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> RunnerResult<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}

/// The meeting sequence cursor on top of a property store.
pub struct MeetingCursor {
    store: Arc<dyn PropertyStore>,
}

impl MeetingCursor {
    pub fn new(store: Arc<dyn PropertyStore>) -> Self {
        Self { store }
    }

    /// Last committed sequence; zero when none has ever committed.
    pub async fn load(&self) -> RunnerResult<MeetingSeq> {
        let seq = self
            .store
            .get(CURSOR_KEY)
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Ok(MeetingSeq(seq))
    }

    /// Persist a committed sequence. Only called after the unit fully
    /// completed; the persisted value never regresses.
    pub async fn commit(&self, seq: MeetingSeq) -> RunnerResult<()> {
        self.store.set(CURSOR_KEY, &seq.value().to_string()).await?;
        debug!(seq = seq.value(), "Committed meeting cursor");
        Ok(())
    }
}
