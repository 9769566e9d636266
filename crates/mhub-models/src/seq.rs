//! Meeting sequence identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonically assigned meeting sequence number.
///
/// Rendered zero-padded to four digits for the human-facing meeting id
/// (`0001`, `0042`, ...); values past 9999 simply widen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingSeq(pub u64);

impl MeetingSeq {
    /// The next sequence value.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Inner value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Human-facing meeting identifier.
    pub fn meeting_id(self) -> String {
        format!("{:04}", self.0)
    }
}

impl fmt::Display for MeetingSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.meeting_id())
    }
}
