//! Gemini REST client for MeetHub.
//!
//! This crate provides:
//! - Resumable chunked upload to the Files API with per-chunk retry
//! - File-state polling until an uploaded object becomes usable
//! - Meeting-minutes generation with typed rate-limit retry
//! - A `ChunkSource` seam so any range-addressable store can feed uploads

pub mod client;
pub mod config;
pub mod error;
pub mod files;
pub mod generate;
pub mod poll;
pub mod upload;

pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use error::{GeminiError, GeminiResult};
pub use files::{FileHandle, FileState};
pub use generate::PromptContext;
pub use upload::{ChunkSource, ChunkSourceError};
