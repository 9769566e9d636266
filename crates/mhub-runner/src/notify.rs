//! End-of-run email notification.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{RunnerError, RunnerResult};
use crate::report::RunReport;

/// Notification configuration.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Transactional-email API key
    pub api_key: String,
    /// Service base URL (overridable for test servers)
    pub base_url: String,
    /// Sender address
    pub sender: String,
    /// Recipient address
    pub recipient: String,
}

impl NotifyConfig {
    /// Build from environment variables; `None` disables notification.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("MAILERSEND_API_KEY").ok()?;
        let sender = std::env::var("MHUB_SENDER_EMAIL").ok()?;
        let recipient = std::env::var("MHUB_ADMIN_EMAIL").ok()?;

        Some(Self {
            api_key,
            base_url: std::env::var("MAILERSEND_BASE_URL")
                .unwrap_or_else(|_| "https://api.mailersend.com".to_string()),
            sender,
            recipient,
        })
    }
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest {
    from: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    text: String,
}

/// Sends the run report by email.
pub struct Notifier {
    http: Client,
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(config: NotifyConfig) -> RunnerResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RunnerError::notify(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Send the report. Failures are surfaced but callers treat them as
    /// non-fatal; a lost report must not fail the invocation.
    pub async fn send_report(&self, report: &RunReport) -> RunnerResult<()> {
        let request = SendEmailRequest {
            from: EmailAddress {
                email: self.config.sender.clone(),
            },
            to: vec![EmailAddress {
                email: self.config.recipient.clone(),
            }],
            subject: report.subject(),
            text: report.body(),
        };

        let url = format!("{}/v1/email", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RunnerError::notify(format!("send failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Report email rejected");
            return Err(RunnerError::notify(format!(
                "email service returned {}: {}",
                status, body
            )));
        }

        info!(recipient = %self.config.recipient, "Sent run report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::report::{UnitOutcome, UnitReport};

    use super::*;

    fn test_report() -> RunReport {
        RunReport::with_unit(UnitReport {
            file_name: "standup.mp4".into(),
            meeting_id: Some("0001".into()),
            title: Some("Standup".into()),
            category: None,
            outcome: UnitOutcome::Succeeded,
        })
    }

    #[tokio::test]
    async fn send_report_posts_email() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/email"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Notifier::new(NotifyConfig {
            api_key: "key".into(),
            base_url: server.uri(),
            sender: "bot@example.com".into(),
            recipient: "admin@example.com".into(),
        })
        .unwrap();

        notifier.send_report(&test_report()).await.unwrap();
    }

    #[tokio::test]
    async fn send_report_surfaces_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/email"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let notifier = Notifier::new(NotifyConfig {
            api_key: "key".into(),
            base_url: server.uri(),
            sender: "bot@example.com".into(),
            recipient: "admin@example.com".into(),
        })
        .unwrap();

        assert!(notifier.send_report(&test_report()).await.is_err());
    }
}
