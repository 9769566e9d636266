//! Queued recording metadata and eligibility rules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name prefix applied to a recording once its minutes have been written.
pub const PROCESSED_MARKER: &str = "[processed]";

/// Name prefix applied to a recording moved aside for exceeding the size cap.
pub const OVERSIZE_MARKER: &str = "[oversize]";

/// Unique identifier of a recording in the source store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingId(pub String);

impl RecordingId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One queued media object, as listed by the source store.
///
/// Lives only for the duration of a single invocation; the source store is
/// the system of record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedRecording {
    /// Source store identifier
    pub id: RecordingId,
    /// Display name (file name)
    pub name: String,
    /// Declared size in bytes
    pub size_bytes: u64,
    /// MIME type, e.g. `audio/mpeg` or `video/mp4`
    pub mime_type: String,
    /// Optional free-text annotation used to pre-seed classification
    pub annotation: Option<String>,
}

impl QueuedRecording {
    /// Whether this object is a candidate for transcription.
    ///
    /// Only audio/video objects that have not already been marked as
    /// processed or quarantined qualify.
    pub fn is_eligible(&self) -> bool {
        self.is_media() && !self.is_marked()
    }

    /// Whether the MIME type identifies a media object.
    pub fn is_media(&self) -> bool {
        self.mime_type.starts_with("audio/") || self.mime_type.starts_with("video/")
    }

    /// Whether the name carries a processed or oversize marker.
    pub fn is_marked(&self) -> bool {
        self.name.contains(PROCESSED_MARKER) || self.name.contains(OVERSIZE_MARKER)
    }

    /// Whether the declared size exceeds the given cap.
    pub fn exceeds(&self, size_limit_bytes: u64) -> bool {
        self.size_bytes > size_limit_bytes
    }

    /// Parse the classification hint from the annotation, if present.
    pub fn annotation_hint(&self) -> Option<AnnotationHint> {
        self.annotation.as_deref().and_then(AnnotationHint::parse)
    }
}

/// Classification hint carried in a recording's annotation.
///
/// The convention is `category, title` separated by an ASCII or ideographic
/// comma; anything that does not split into two non-empty parts is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationHint {
    pub category: String,
    pub title: String,
}

impl AnnotationHint {
    /// Parse a `category, title` annotation.
    pub fn parse(annotation: &str) -> Option<Self> {
        let mut parts = annotation.splitn(2, [',', '、']);
        let category = parts.next()?.trim();
        let title = parts.next()?.trim();

        if category.is_empty() || title.is_empty() {
            return None;
        }

        Some(Self {
            category: category.to_string(),
            title: title.to_string(),
        })
    }
}
