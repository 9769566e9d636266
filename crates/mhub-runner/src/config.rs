//! Runner configuration.

use std::path::PathBuf;

use crate::error::{RunnerError, RunnerResult};
use crate::notify::NotifyConfig;

/// Reference size cap for a single recording.
const DEFAULT_SIZE_LIMIT_MB: u64 = 50;

/// Runner configuration, loaded once at startup and passed explicitly to
/// every component.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Folder holding queued recordings
    pub input_folder_id: String,
    /// Folder receiving per-meeting archive subfolders
    pub archive_folder_id: String,
    /// Folder receiving quarantined oversized recordings
    pub oversize_folder_id: String,
    /// Database receiving meeting-log pages
    pub logs_database_id: String,
    /// Database receiving action-item pages
    pub actions_database_id: String,
    /// Recordings above this size are quarantined, not uploaded
    pub size_limit_bytes: u64,
    /// Path of the JSON state file holding the sequence cursor
    pub state_path: PathBuf,
    /// Optional name-disambiguation glossary file
    pub glossary_path: Option<PathBuf>,
    /// Skip generation and all source mutations; report with a canned result
    pub dry_run: bool,
    /// Optional end-of-run email notification
    pub notify: Option<NotifyConfig>,
}

impl RunnerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> RunnerResult<Self> {
        Ok(Self {
            input_folder_id: required("MHUB_INPUT_FOLDER_ID")?,
            archive_folder_id: required("MHUB_ARCHIVE_FOLDER_ID")?,
            oversize_folder_id: required("MHUB_OVERSIZE_FOLDER_ID")?,
            logs_database_id: required("NOTION_LOGS_DB_ID")?,
            actions_database_id: required("NOTION_ACTIONS_DB_ID")?,
            size_limit_bytes: std::env::var("MHUB_SIZE_LIMIT_MB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SIZE_LIMIT_MB)
                * 1024
                * 1024,
            state_path: std::env::var("MHUB_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("mhub-state.json")),
            glossary_path: std::env::var("MHUB_GLOSSARY_PATH").ok().map(PathBuf::from),
            dry_run: std::env::var("MHUB_DRY_RUN")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            notify: NotifyConfig::from_env(),
        })
    }
}

fn required(name: &str) -> RunnerResult<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RunnerError::config(format!("{} not set", name)))
}
