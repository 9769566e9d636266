//! Wire-level tests for upload, readiness polling and generation against a
//! mock Gemini server.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mhub_gemini::{
    ChunkSource, ChunkSourceError, FileHandle, GeminiClient, GeminiConfig, GeminiError,
};

// =============================================================================
// Helpers
// =============================================================================

fn test_config(base_url: &str) -> GeminiConfig {
    let mut config = GeminiConfig::new("test-key");
    config.base_url = base_url.to_string();
    config.chunk_size = 8;
    config.chunk_retry_delay = Duration::from_millis(1);
    config.fallback_settle_delay = Duration::from_millis(1);
    config.poll_interval = Duration::from_millis(1);
    config.poll_attempt_limit = 3;
    config.rate_limit_cooldown = Duration::from_millis(1);
    config
}

fn test_client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(test_config(&server.uri())).unwrap()
}

/// In-memory byte source for upload tests.
struct MemorySource(Vec<u8>);

#[async_trait]
impl ChunkSource for MemorySource {
    async fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>, ChunkSourceError> {
        let start = offset as usize;
        let end = start + len as usize;
        self.0
            .get(start..end)
            .map(|s| s.to_vec())
            .ok_or_else(|| ChunkSourceError(format!("range {}..{} out of bounds", start, end)))
    }
}

async fn mount_handshake(server: &MockServer) {
    let session_url = format!("{}/session", server.uri());
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()))
        .mount(server)
        .await;
}

fn minutes_response(minutes: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": minutes.to_string() }]
            }
        }]
    }))
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn upload_splits_into_contiguous_chunks() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    let file_uri = "https://generativelanguage.googleapis.com/v1beta/files/abc123";
    let payload = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123";

    // 30 bytes at chunk size 8: offsets 0/8/16/24, sizes 8/8/8/6, only the
    // last chunk finalizes. Each mock pins one (offset, body) pair, so a
    // skipped, reordered or resent chunk fails its expect count.
    for (offset, body) in [(0, "ABCDEFGH"), (8, "IJKLMNOP"), (16, "QRSTUVWX")] {
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(header("X-Goog-Upload-Offset", offset.to_string().as_str()))
            .and(header("X-Goog-Upload-Command", "upload"))
            .and(body_string(body))
            .respond_with(ResponseTemplate::new(308))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/session"))
        .and(header("X-Goog-Upload-Offset", "24"))
        .and(header("X-Goog-Upload-Command", "upload, finalize"))
        .and(body_string("YZ0123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "file": { "uri": file_uri } })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let source = MemorySource(payload.as_bytes().to_vec());

    let handle = client
        .upload(&source, "meeting.mp4", "video/mp4", 30)
        .await
        .unwrap();
    assert_eq!(handle.uri(), file_uri);
}

#[tokio::test]
async fn upload_retries_a_failed_chunk_and_succeeds() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    let file_uri = "https://generativelanguage.googleapis.com/v1beta/files/retry1";

    // First attempt on the only chunk fails, the retry lands
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "file": { "uri": file_uri } })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let source = MemorySource(vec![1u8; 8]);

    let handle = client
        .upload(&source, "meeting.mp4", "video/mp4", 8)
        .await
        .unwrap();
    assert_eq!(handle.uri(), file_uri);
}

#[tokio::test]
async fn upload_abandons_after_chunk_retry_budget() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    // Two chunks total, but the first never succeeds: exactly three
    // attempts on offset 0 and no attempt on the second chunk
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let source = MemorySource(vec![0u8; 16]);

    let err = client
        .upload(&source, "meeting.mp4", "video/mp4", 16)
        .await
        .unwrap_err();

    match err {
        GeminiError::Transfer { offset, attempts, .. } => {
            assert_eq!(offset, 0);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected Transfer error, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_fails_fast_on_handshake_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let source = MemorySource(vec![0u8; 8]);

    let err = client
        .upload(&source, "meeting.mp4", "video/mp4", 8)
        .await
        .unwrap_err();
    assert!(matches!(err, GeminiError::Protocol(_)));
}

#[tokio::test]
async fn upload_requires_session_endpoint_in_handshake() {
    let server = MockServer::start().await;

    // Success status but no x-goog-upload-url header
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let source = MemorySource(vec![0u8; 8]);

    let err = client
        .upload(&source, "meeting.mp4", "video/mp4", 8)
        .await
        .unwrap_err();
    assert!(matches!(err, GeminiError::Protocol(_)));
}

#[tokio::test]
async fn upload_recovers_handle_from_listing_when_finalize_omits_it() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    let target_uri = "https://generativelanguage.googleapis.com/v1beta/files/recovered";

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    // Newest-first listing; the name match wins over the newer entry.
    // Known best-effort path: with concurrent same-name uploads this pick
    // is racy, and that is accepted behavior.
    Mock::given(method("GET"))
        .and(path("/v1beta/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                { "uri": "https://generativelanguage.googleapis.com/v1beta/files/newer", "displayName": "other.mp4" },
                { "uri": target_uri, "displayName": "meeting.mp4" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let source = MemorySource(vec![0u8; 8]);

    let handle = client
        .upload(&source, "meeting.mp4", "video/mp4", 8)
        .await
        .unwrap();
    assert_eq!(handle.uri(), target_uri);
}

// =============================================================================
// Readiness polling
// =============================================================================

#[tokio::test]
async fn await_active_returns_once_processing_completes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "PROCESSING" })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "ACTIVE" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let handle = FileHandle::new("https://generativelanguage.googleapis.com/v1beta/files/abc");

    client.await_active(&handle).await.unwrap();
}

#[tokio::test]
async fn await_active_times_out_after_poll_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "PROCESSING" })))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let handle = FileHandle::new("https://generativelanguage.googleapis.com/v1beta/files/abc");

    let err = client.await_active(&handle).await.unwrap_err();
    assert!(matches!(err, GeminiError::ReadinessTimeout { attempts: 3 }));
}

#[tokio::test]
async fn await_active_rejects_failed_ingestion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "FAILED" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let handle = FileHandle::new("https://generativelanguage.googleapis.com/v1beta/files/abc");

    let err = client.await_active(&handle).await.unwrap_err();
    assert!(matches!(err, GeminiError::ProcessingFailed(_)));
}

// =============================================================================
// Generation
// =============================================================================

fn sample_minutes() -> serde_json::Value {
    json!({
        "title": "Weekly sync",
        "date": "2026-08-06",
        "attendees": ["Tanaka", "Suzuki"],
        "summary": "Agreed to ship on Friday.",
        "actions": [
            { "task": "Prepare release notes", "assignee": "Tanaka", "due_date": "2026-08-07" }
        ]
    })
}

fn prompt_ctx() -> mhub_gemini::PromptContext {
    mhub_gemini::PromptContext::new(chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap())
}

#[tokio::test]
async fn generation_retries_through_rate_limit_and_succeeds() {
    let server = MockServer::start().await;
    let generate_path = "/v1beta/models/gemini-2.5-flash:generateContent";

    Mock::given(method("POST"))
        .and(path(generate_path))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(generate_path))
        .respond_with(minutes_response(sample_minutes()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let handle = FileHandle::new("https://generativelanguage.googleapis.com/v1beta/files/abc");

    let minutes = client
        .generate_minutes_with_retry(&handle, "video/mp4", &prompt_ctx())
        .await
        .unwrap();

    assert_eq!(minutes.title, "Weekly sync");
    assert_eq!(minutes.attendees.len(), 2);
    assert_eq!(minutes.actions.len(), 1);
}

#[tokio::test]
async fn generation_exhausts_rate_limit_budget() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let handle = FileHandle::new("https://generativelanguage.googleapis.com/v1beta/files/abc");

    let err = client
        .generate_minutes_with_retry(&handle, "video/mp4", &prompt_ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, GeminiError::RetryExhausted { attempts: 3 }));
}

#[tokio::test]
async fn generation_does_not_retry_bad_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_string("malformed"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let handle = FileHandle::new("https://generativelanguage.googleapis.com/v1beta/files/abc");

    let err = client
        .generate_minutes_with_retry(&handle, "video/mp4", &prompt_ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, GeminiError::Generation(_)));
}

#[tokio::test]
async fn generation_rejects_non_json_output() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Here are your minutes: ..." }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let handle = FileHandle::new("https://generativelanguage.googleapis.com/v1beta/files/abc");

    let err = client
        .generate_minutes_with_retry(&handle, "video/mp4", &prompt_ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, GeminiError::InvalidResponse(_)));
}
