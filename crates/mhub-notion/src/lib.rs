//! Notion record-store client.
//!
//! This crate provides:
//! - A pages API client with typed property payload builders
//! - The meeting-record writer: one log page per meeting plus linked
//!   action-item pages

pub mod client;
pub mod error;
pub mod records;
pub mod types;

pub use client::{NotionClient, NotionConfig};
pub use error::{NotionError, NotionResult};
pub use records::{MeetingRecordWriter, PropertyMap};
