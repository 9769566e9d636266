//! Run reports.
//!
//! Each stage produces a new immutable value rather than mutating shared
//! fields, so the report always reflects exactly what happened, including
//! which stage a unit died in.

use std::fmt;

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Scanning the queue for an eligible recording
    Select,
    /// Resumable upload to the transcription service
    Transfer,
    /// Waiting for the uploaded file to become active
    AwaitReady,
    /// The generation call
    Generate,
    /// Writing the result to the record store
    Record,
    /// Persisting the sequence cursor
    Commit,
    /// Archiving and marking the source recording
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Select => "select",
            Stage::Transfer => "transfer",
            Stage::AwaitReady => "await-ready",
            Stage::Generate => "generate",
            Stage::Record => "record",
            Stage::Commit => "commit",
            Stage::Finalize => "finalize",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of the one unit an invocation handled.
#[derive(Debug, Clone)]
pub enum UnitOutcome {
    /// Minutes written, cursor committed, recording archived
    Succeeded,
    /// Oversized; moved aside without entering the pipeline
    Quarantined,
    /// Failed at a stage; the recording stays queued for the next run
    Failed { stage: Stage, message: String },
}

/// What happened to one recording.
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub file_name: String,
    pub meeting_id: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub outcome: UnitOutcome,
}

impl UnitReport {
    fn outcome_line(&self) -> String {
        match &self.outcome {
            UnitOutcome::Succeeded => "succeeded".to_string(),
            UnitOutcome::Quarantined => "quarantined (size cap exceeded)".to_string(),
            UnitOutcome::Failed { stage, message } => {
                format!("failed at {}: {}", stage, message)
            }
        }
    }
}

/// Report for one invocation. At most one unit by design.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub units: Vec<UnitReport>,
}

impl RunReport {
    pub fn with_unit(unit: UnitReport) -> Self {
        Self { units: vec![unit] }
    }

    /// Nothing eligible was found this run.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn processed_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::Succeeded))
            .count()
    }

    /// Notification subject line.
    pub fn subject(&self) -> String {
        format!(
            "Meeting minutes run: {} of {} succeeded",
            self.processed_count(),
            self.units.len()
        )
    }

    /// Notification body text.
    pub fn body(&self) -> String {
        let blocks: Vec<String> = self
            .units
            .iter()
            .map(|u| {
                let mut lines = vec![format!("File: {}", u.file_name)];
                if let Some(id) = &u.meeting_id {
                    lines.push(format!("Meeting ID: {}", id));
                }
                if let Some(title) = &u.title {
                    lines.push(format!("Title: {}", title));
                }
                if let Some(category) = &u.category {
                    lines.push(format!("Category: {}", category));
                }
                lines.push(format!("Result: {}", u.outcome_line()));
                lines.join("\n")
            })
            .collect();

        blocks.join("\n----------------------------------\n")
    }
}
