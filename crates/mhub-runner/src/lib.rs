//! Single-unit meeting transcription runner.
//!
//! This crate provides:
//! - The scheduler that drives one recording through upload, readiness,
//!   generation and record writing
//! - The durable sequence cursor (commit-last)
//! - Run reports and the end-of-invocation email notifier
//! - Environment-based configuration

pub mod config;
pub mod cursor;
pub mod error;
pub mod notify;
pub mod processor;
pub mod report;

pub use config::RunnerConfig;
pub use cursor::{JsonPropertyStore, MeetingCursor, PropertyStore};
pub use error::{RunnerError, RunnerResult};
pub use notify::{Notifier, NotifyConfig};
pub use processor::RecordingProcessor;
pub use report::{RunReport, Stage, UnitOutcome, UnitReport};
