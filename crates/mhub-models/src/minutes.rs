//! Generated meeting minutes.

use serde::{Deserialize, Serialize};

use crate::utils::is_valid_date;

/// Structured minutes produced by the generation call.
///
/// The remote service is instructed to return exactly this shape as strict
/// JSON; anything that fails to deserialize into it is a generation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingMinutes {
    /// Meeting title proposed by the model
    pub title: String,
    /// Meeting date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// Participant names extracted from the audio
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Prose summary centered on decisions made
    pub summary: String,
    /// Ordered action items
    #[serde(default)]
    pub actions: Vec<ActionItem>,
}

/// A single action item extracted from the meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    /// Concrete task description
    pub task: String,
    /// Assignee name(s); may list several separated by commas
    #[serde(default)]
    pub assignee: Option<String>,
    /// Due date, `YYYY-MM-DD`; empty or missing when unknown
    #[serde(default)]
    pub due_date: Option<String>,
}

impl MeetingMinutes {
    /// The meeting date, if present and a real calendar date.
    pub fn valid_date(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| is_valid_date(d))
    }

    /// Override the date, keeping the previous value when the new one is
    /// not a valid calendar date.
    pub fn with_date_override(mut self, date: impl Into<String>) -> Self {
        let date = date.into();
        if is_valid_date(&date) {
            self.date = Some(date);
        }
        self
    }
}

impl ActionItem {
    /// The due date, if present, non-empty and a real calendar date.
    pub fn valid_due_date(&self) -> Option<&str> {
        self.due_date.as_deref().filter(|d| is_valid_date(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_deserialization() {
        let json = r#"{
            "title": "Q3 pipeline review",
            "date": "2026-08-06",
            "attendees": ["Tanaka", "Suzuki"],
            "summary": "Agreed to extend the trial period.",
            "actions": [
                {"task": "Draft the extension contract", "assignee": "Tanaka", "due_date": "2026-08-13"},
                {"task": "Notify the customer", "assignee": "Suzuki", "due_date": ""}
            ]
        }"#;

        let minutes: MeetingMinutes = serde_json::from_str(json).unwrap();
        assert_eq!(minutes.title, "Q3 pipeline review");
        assert_eq!(minutes.valid_date(), Some("2026-08-06"));
        assert_eq!(minutes.attendees.len(), 2);
        assert_eq!(minutes.actions.len(), 2);
        assert_eq!(minutes.actions[0].valid_due_date(), Some("2026-08-13"));
        // Empty due date is treated as unknown
        assert_eq!(minutes.actions[1].valid_due_date(), None);
    }

    #[test]
    fn test_minutes_missing_optional_fields() {
        let json = r#"{"title": "Standup", "summary": "Nothing blocking."}"#;
        let minutes: MeetingMinutes = serde_json::from_str(json).unwrap();
        assert!(minutes.date.is_none());
        assert!(minutes.attendees.is_empty());
        assert!(minutes.actions.is_empty());
    }

    #[test]
    fn test_date_override_rejects_invalid() {
        let minutes: MeetingMinutes =
            serde_json::from_str(r#"{"title": "t", "date": "2026-01-15", "summary": "s"}"#).unwrap();

        let minutes = minutes.with_date_override("2026-02-30");
        assert_eq!(minutes.valid_date(), Some("2026-01-15"));

        let minutes = minutes.with_date_override("2026-02-28");
        assert_eq!(minutes.valid_date(), Some("2026-02-28"));
    }
}
