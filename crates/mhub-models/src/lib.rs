//! Shared data models for the MeetHub backend.
//!
//! This crate provides Serde-serializable types for:
//! - Queued recordings and their eligibility rules
//! - Generated meeting minutes and action items
//! - Meeting sequence identifiers
//! - Date and annotation parsing helpers

pub mod minutes;
pub mod recording;
pub mod seq;
pub mod utils;

// Re-export common types
pub use minutes::{ActionItem, MeetingMinutes};
pub use recording::{AnnotationHint, QueuedRecording, RecordingId, OVERSIZE_MARKER, PROCESSED_MARKER};
pub use seq::MeetingSeq;
pub use utils::{date_from_file_name, is_valid_date, sanitize_folder_name, split_names};
