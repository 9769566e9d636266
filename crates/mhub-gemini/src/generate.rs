//! Meeting-minutes generation with rate-limit retry.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mhub_models::MeetingMinutes;

use crate::client::GeminiClient;
use crate::error::{GeminiError, GeminiResult};
use crate::files::FileHandle;

/// Context threaded into the generation prompt.
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Today's date; unqualified years in the audio default to this year
    pub today: NaiveDate,
    /// Optional name-disambiguation table, embedded verbatim
    pub glossary: Option<String>,
}

impl PromptContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            glossary: None,
        }
    }

    pub fn with_glossary(mut self, glossary: impl Into<String>) -> Self {
        self.glossary = Some(glossary.into());
        self
    }
}

/// Gemini generation request.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "file_data", skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(rename = "mime_type")]
    mime_type: String,
    #[serde(rename = "file_uri")]
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini generation response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    /// Generate minutes, retrying only on the remote's rate-limit signal.
    ///
    /// A rate-limited attempt sleeps the configured cool-down and tries
    /// again, up to the attempt budget; exhausting the budget surfaces as
    /// `RetryExhausted` so callers can tell quota pressure from a broken
    /// request. Every other failure propagates immediately -- retrying a
    /// bad request or auth failure cannot succeed and only burns the
    /// invocation's time budget.
    pub async fn generate_minutes_with_retry(
        &self,
        handle: &FileHandle,
        mime_type: &str,
        ctx: &PromptContext,
    ) -> GeminiResult<MeetingMinutes> {
        let budget = self.config.generate_attempt_limit;

        for attempt in 1..=budget {
            match self.generate_minutes(handle, mime_type, ctx).await {
                Ok(minutes) => return Ok(minutes),
                Err(e) if e.is_rate_limited() => {
                    if attempt >= budget {
                        return Err(GeminiError::RetryExhausted { attempts: budget });
                    }
                    warn!(
                        attempt,
                        budget,
                        cooldown_secs = self.config.rate_limit_cooldown.as_secs(),
                        "Generation rate-limited, cooling down"
                    );
                    tokio::time::sleep(self.config.rate_limit_cooldown).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(GeminiError::RetryExhausted { attempts: budget })
    }

    /// One generation attempt against an active file handle.
    pub async fn generate_minutes(
        &self,
        handle: &FileHandle,
        mime_type: &str,
        ctx: &PromptContext,
    ) -> GeminiResult<MeetingMinutes> {
        let url = self.url(&format!("/v1beta/models/{}:generateContent", self.config.model));

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(build_minutes_prompt(ctx)),
                        file_data: None,
                    },
                    Part {
                        text: None,
                        file_data: Some(FileData {
                            mime_type: mime_type.to_string(),
                            file_uri: handle.uri().to_string(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after_ms = retry_after_ms(&response);
            let body = response.text().await.unwrap_or_default();

            if status == 429 {
                return Err(GeminiError::RateLimited(retry_after_ms));
            }
            return Err(GeminiError::generation(format!("HTTP {}: {}", status, body)));
        }

        let generated: GenerateResponse = response.json().await?;

        let text = generated
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| GeminiError::invalid_response("no content in generation response"))?;

        let minutes: MeetingMinutes = serde_json::from_str(strip_code_fence(text)).map_err(|e| {
            GeminiError::invalid_response(format!("generation output is not minutes JSON: {}", e))
        })?;

        info!(title = %minutes.title, actions = minutes.actions.len(), "Generated minutes");
        Ok(minutes)
    }
}

fn retry_after_ms(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(|secs| secs * 1000)
}

/// Strip a markdown code fence if the model wrapped its JSON anyway.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Build the minutes-extraction prompt.
fn build_minutes_prompt(ctx: &PromptContext) -> String {
    let today = ctx.today.format("%Y-%m-%d");
    let year = ctx.today.year();

    let mut prompt = format!(
        r#"# Role
You are a highly capable executive assistant. Produce accurate meeting
minutes from the provided recording.

# Context
- Today's date: {today}
- When a date is mentioned without a year, assume {year}.

# Extraction guidelines
1. attendees:
   - List every participant, identified from introductions, greetings and
     who is speaking.
   - Use full names whenever the recording reveals them.
2. actions:
   - Capture every task someone commits to or is asked to take on.
   - When no assignee is stated but context makes one clear, name them.
   - Convert relative deadlines ("next week", "end of the month") into
     concrete YYYY-MM-DD dates relative to today ({today}).
3. summary:
   - Center on decisions made, with enough of the discussion to show how
     they were reached. At most 300 words.
"#
    );

    if let Some(glossary) = &ctx.glossary {
        prompt.push_str("\n# Name reference\nPrefer these spellings when they match what you hear:\n");
        prompt.push_str(glossary);
        prompt.push('\n');
    }

    prompt.push_str(
        r#"
# Output format (JSON only)
{
  "title": "A specific title conveying the meeting's purpose",
  "date": "YYYY-MM-DD",
  "attendees": ["Name 1", "Name 2"],
  "summary": "Summary text",
  "actions": [
    {
      "task": "Concrete task description (draft X, contact Y)",
      "assignee": "Assignee name",
      "due_date": "YYYY-MM-DD (empty string when unknown)"
    }
  ]
}"#,
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_date_context() {
        let ctx = PromptContext::new(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        let prompt = build_minutes_prompt(&ctx);
        assert!(prompt.contains("Today's date: 2026-08-06"));
        assert!(prompt.contains("assume 2026"));
        assert!(!prompt.contains("Name reference"));
    }

    #[test]
    fn test_prompt_embeds_glossary() {
        let ctx = PromptContext::new(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap())
            .with_glossary("Tanaka Ichiro = 田中一郎");
        let prompt = build_minutes_prompt(&ctx);
        assert!(prompt.contains("Name reference"));
        assert!(prompt.contains("田中一郎"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }
}
