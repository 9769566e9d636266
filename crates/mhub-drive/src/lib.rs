//! Google Drive source-storage client.
//!
//! This crate provides:
//! - A Drive v3 REST client: folder listing, byte-range media reads,
//!   rename, move and folder creation
//! - Cached bearer-token auth with a provider seam for tests
//! - The recording queue: eligibility scan, oversize quarantine and
//!   post-processing archival
//! - A `ChunkSource` implementation feeding resumable uploads

pub mod client;
pub mod error;
pub mod queue;
pub mod token;

pub use client::{DriveClient, DriveConfig, DriveFile};
pub use error::{DriveError, DriveResult};
pub use queue::{DriveChunkSource, RecordingQueue};
pub use token::{AccessTokenProvider, GcpTokenProvider, StaticTokenProvider};
