//! Meeting transcription runner binary.
//!
//! One invocation processes at most one queued recording; an external
//! scheduler re-invokes it periodically and keeps invocations serialized.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mhub_drive::{DriveClient, RecordingQueue};
use mhub_gemini::GeminiClient;
use mhub_notion::{MeetingRecordWriter, NotionClient, PropertyMap};
use mhub_runner::{
    JsonPropertyStore, MeetingCursor, Notifier, RecordingProcessor, RunnerConfig,
};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("mhub=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting mhub-runner");

    let config = match RunnerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if config.dry_run {
        info!("Dry run enabled: generation and source mutations are skipped");
    }

    let processor = match build_processor(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    let report = match processor.run_once().await {
        Ok(report) => report,
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    };

    if report.is_empty() {
        info!("Nothing to do this invocation");
        return;
    }

    info!(
        processed = report.processed_count(),
        total = report.units.len(),
        "Run complete"
    );

    // A lost report is logged, never fatal
    if let Some(notify_config) = config.notify.clone() {
        match Notifier::new(notify_config) {
            Ok(notifier) => {
                if let Err(e) = notifier.send_report(&report).await {
                    warn!("Failed to send run report: {}", e);
                }
            }
            Err(e) => warn!("Failed to create notifier: {}", e),
        }
    }
}

fn build_processor(config: &RunnerConfig) -> anyhow::Result<RecordingProcessor> {
    let drive = DriveClient::from_env()?;
    let queue = RecordingQueue::new(
        drive,
        config.input_folder_id.clone(),
        config.archive_folder_id.clone(),
        config.oversize_folder_id.clone(),
    );

    let gemini = GeminiClient::from_env()?;

    let writer = MeetingRecordWriter::new(
        NotionClient::from_env()?,
        config.logs_database_id.clone(),
        config.actions_database_id.clone(),
        PropertyMap::default(),
    );

    let cursor = MeetingCursor::new(Arc::new(JsonPropertyStore::new(config.state_path.clone())));

    let mut processor =
        RecordingProcessor::new(queue, gemini, writer, cursor, config.size_limit_bytes)
            .with_dry_run(config.dry_run);

    if let Some(path) = &config.glossary_path {
        let glossary = std::fs::read_to_string(path)?;
        processor = processor.with_glossary(glossary);
    }

    Ok(processor)
}
