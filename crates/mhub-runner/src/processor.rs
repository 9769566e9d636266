//! The single-unit scheduler.
//!
//! One invocation handles at most one recording: scan, quarantine or
//! upload, await readiness, generate, write the record, commit the cursor,
//! archive the source. The cap is a deliberate bound on invocation
//! duration, not a pipeline limitation. A fatal error at any stage leaves
//! the recording untouched in the queue and the cursor unadvanced, so the
//! next invocation retries the whole unit from scratch.

use chrono::Local;
use tracing::{error, info};

use mhub_drive::{DriveChunkSource, RecordingQueue};
use mhub_gemini::{GeminiClient, PromptContext};
use mhub_models::{
    date_from_file_name, sanitize_folder_name, AnnotationHint, MeetingMinutes, MeetingSeq,
    QueuedRecording,
};
use mhub_notion::MeetingRecordWriter;

use crate::cursor::MeetingCursor;
use crate::error::RunnerResult;
use crate::report::{RunReport, Stage, UnitOutcome, UnitReport};

/// Drives one recording through the pipeline per invocation.
pub struct RecordingProcessor {
    queue: RecordingQueue,
    gemini: GeminiClient,
    writer: MeetingRecordWriter,
    cursor: MeetingCursor,
    size_limit_bytes: u64,
    glossary: Option<String>,
    dry_run: bool,
}

struct Processed {
    title: String,
    category: Option<String>,
}

impl RecordingProcessor {
    pub fn new(
        queue: RecordingQueue,
        gemini: GeminiClient,
        writer: MeetingRecordWriter,
        cursor: MeetingCursor,
        size_limit_bytes: u64,
    ) -> Self {
        Self {
            queue,
            gemini,
            writer,
            cursor,
            size_limit_bytes,
            glossary: None,
            dry_run: false,
        }
    }

    /// Embed a name-disambiguation glossary into generation prompts.
    pub fn with_glossary(mut self, glossary: impl Into<String>) -> Self {
        self.glossary = Some(glossary.into());
        self
    }

    /// Skip generation and source mutations, substituting a canned result.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process at most one queued recording.
    pub async fn run_once(&self) -> RunnerResult<RunReport> {
        let Some(recording) = self.queue.next_candidate().await? else {
            info!("No eligible recordings queued");
            return Ok(RunReport::default());
        };

        // Oversized units are moved aside without entering the pipeline
        // and without consuming a sequence number.
        if recording.exceeds(self.size_limit_bytes) {
            self.queue.quarantine(&recording).await?;
            return Ok(RunReport::with_unit(UnitReport {
                file_name: recording.name,
                meeting_id: None,
                title: None,
                category: None,
                outcome: UnitOutcome::Quarantined,
            }));
        }

        let seq = self.cursor.load().await?.next();
        let hint = recording.annotation_hint();

        info!(file = %recording.name, meeting_id = %seq, "Processing recording");

        match self.process(&recording, seq, hint.as_ref()).await {
            Ok(processed) => Ok(RunReport::with_unit(UnitReport {
                file_name: recording.name,
                meeting_id: Some(seq.meeting_id()),
                title: Some(processed.title),
                category: processed.category,
                outcome: UnitOutcome::Succeeded,
            })),
            Err((stage, err)) => {
                error!(
                    file = %recording.name,
                    %stage,
                    error = %err,
                    "Recording failed; it stays queued for the next invocation"
                );
                Ok(RunReport::with_unit(UnitReport {
                    file_name: recording.name,
                    meeting_id: Some(seq.meeting_id()),
                    title: hint.as_ref().map(|h| h.title.clone()),
                    category: hint.as_ref().map(|h| h.category.clone()),
                    outcome: UnitOutcome::Failed {
                        stage,
                        message: err.to_string(),
                    },
                }))
            }
        }
    }

    async fn process(
        &self,
        recording: &QueuedRecording,
        seq: MeetingSeq,
        hint: Option<&AnnotationHint>,
    ) -> Result<Processed, (Stage, crate::error::RunnerError)> {
        let minutes = if self.dry_run {
            info!("Dry run: skipping upload and generation");
            canned_minutes()
        } else {
            self.transcribe(recording).await?
        };

        // A date block leading the file name beats the model's guess.
        let minutes = match date_from_file_name(&recording.name) {
            Some(date) => minutes.with_date_override(date),
            None => minutes,
        };

        let title = resolve_title(hint, &minutes, &recording.name);
        let category = hint.map(|h| h.category.clone());

        let mut record = minutes;
        record.title = title.clone();

        self.writer
            .write(&record, category.as_deref(), &seq.meeting_id())
            .await
            .map_err(|e| (Stage::Record, e.into()))?;

        self.cursor
            .commit(seq)
            .await
            .map_err(|e| (Stage::Commit, e))?;

        if !self.dry_run {
            let folder_name =
                sanitize_folder_name(&format!("{}_{}", seq.meeting_id(), title));
            self.queue
                .archive(recording, &folder_name)
                .await
                .map_err(|e| (Stage::Finalize, e.into()))?;
        }

        Ok(Processed { title, category })
    }

    async fn transcribe(
        &self,
        recording: &QueuedRecording,
    ) -> Result<MeetingMinutes, (Stage, crate::error::RunnerError)> {
        let source = DriveChunkSource::new(self.queue.drive(), recording.id.as_str());

        let handle = self
            .gemini
            .upload(
                &source,
                &recording.name,
                &recording.mime_type,
                recording.size_bytes,
            )
            .await
            .map_err(|e| (Stage::Transfer, e.into()))?;

        self.gemini
            .await_active(&handle)
            .await
            .map_err(|e| (Stage::AwaitReady, e.into()))?;

        let mut ctx = PromptContext::new(Local::now().date_naive());
        if let Some(glossary) = &self.glossary {
            ctx = ctx.with_glossary(glossary.clone());
        }

        self.gemini
            .generate_minutes_with_retry(&handle, &recording.mime_type, &ctx)
            .await
            .map_err(|e| (Stage::Generate, e.into()))
    }
}

/// Annotation hint beats the generated title; an empty generation falls
/// back to the file name.
fn resolve_title(
    hint: Option<&AnnotationHint>,
    minutes: &MeetingMinutes,
    file_name: &str,
) -> String {
    if let Some(hint) = hint {
        return hint.title.clone();
    }
    if !minutes.title.trim().is_empty() {
        return minutes.title.clone();
    }
    file_name.to_string()
}

fn canned_minutes() -> MeetingMinutes {
    MeetingMinutes {
        title: "Dry-run check".to_string(),
        date: None,
        attendees: vec!["Dry run".to_string()],
        summary: "Dry run: generation skipped.".to_string(),
        actions: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes_titled(title: &str) -> MeetingMinutes {
        MeetingMinutes {
            title: title.to_string(),
            date: None,
            attendees: vec![],
            summary: "s".to_string(),
            actions: vec![],
        }
    }

    #[test]
    fn test_hint_title_wins() {
        let hint = AnnotationHint {
            category: "ops".into(),
            title: "Weekly sync".into(),
        };
        let title = resolve_title(Some(&hint), &minutes_titled("Generated"), "rec.mp4");
        assert_eq!(title, "Weekly sync");
    }

    #[test]
    fn test_generated_title_without_hint() {
        let title = resolve_title(None, &minutes_titled("Generated"), "rec.mp4");
        assert_eq!(title, "Generated");
    }

    #[test]
    fn test_file_name_fallback() {
        let title = resolve_title(None, &minutes_titled("   "), "rec.mp4");
        assert_eq!(title, "rec.mp4");
    }
}
