//! Outbound email.
//!
//! Supports two providers:
//! - `console`: logs emails (development)
//! - `http`: posts a provider-neutral JSON document to `email.api_url` with a
//!   bearer key, which a relay or a thin adapter forwards to the actual vendor

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::EmailConfig;

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider rejected email with status {status}: {body}")]
    ProviderError { status: u16, body: String },
}

/// File attached to a message.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name (optional)
    pub to_name: Option<String>,
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (optional)
    pub body_html: Option<String>,
    pub attachments: Vec<EmailAttachment>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            to_name: None,
            subject: subject.into(),
            body_text: body_text.into(),
            body_html: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.to_name = Some(name.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.body_html = Some(html.into());
        self
    }

    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    content_type: &'a str,
    /// Base64, standard alphabet
    content: String,
}

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    from: Address<'a>,
    to: Vec<Address<'a>>,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

/// Email service for transactional and newsletter mail.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("provider", &self.config.provider)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmailError::SendFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// True when sends will be attempted.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn sender_email(&self) -> &str {
        &self.config.sender_email
    }

    /// Send an email message.
    pub async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if !self.is_configured() {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email not configured, skipping send"
            );
            return Err(EmailError::NotConfigured);
        }

        match self.config.provider.as_str() {
            "console" => {
                self.send_console(message);
                Ok(())
            }
            "http" => self.send_http(message).await,
            _ => Err(EmailError::NotConfigured),
        }
    }

    fn send_console(&self, message: &EmailMessage) {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            attachments = message.attachments.len(),
            "Email (console provider)"
        );
        debug!(body_text = %message.body_text, "Email body (plain text)");
    }

    async fn send_http(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let payload = build_payload(&self.config, message);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("Email request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            info!(to = %message.to, subject = %message.subject, "Email sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            to = %message.to,
            status = status.as_u16(),
            "Email provider rejected message"
        );
        Err(EmailError::ProviderError {
            status: status.as_u16(),
            body: truncate(&body, 500),
        })
    }
}

fn build_payload<'a>(config: &'a EmailConfig, message: &'a EmailMessage) -> SendPayload<'a> {
    SendPayload {
        from: Address {
            email: &config.sender_email,
            name: Some(&config.sender_name),
        },
        to: vec![Address {
            email: &message.to,
            name: message.to_name.as_deref(),
        }],
        subject: &message.subject,
        text: &message.body_text,
        html: message.body_html.as_deref(),
        attachments: message
            .attachments
            .iter()
            .map(|a| AttachmentPayload {
                filename: &a.filename,
                content_type: &a.content_type,
                content: base64::engine::general_purpose::STANDARD.encode(&a.content),
            })
            .collect(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console_config(enabled: bool) -> EmailConfig {
        EmailConfig {
            enabled,
            provider: "console".to_string(),
            sender_email: "noreply@advisory.test".to_string(),
            sender_name: "Advisory".to_string(),
            ..EmailConfig::default()
        }
    }

    fn message() -> EmailMessage {
        EmailMessage::new("jane@example.com", "Hello", "Body").with_name("Jane")
    }

    #[tokio::test]
    async fn test_console_send_succeeds() {
        let service = EmailService::new(console_config(true)).unwrap();
        assert!(service.is_configured());
        assert!(service.send(&message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_service_reports_not_configured() {
        let service = EmailService::new(console_config(false)).unwrap();
        assert!(!service.is_configured());
        assert!(matches!(
            service.send(&message()).await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[test]
    fn test_payload_shape() {
        let config = console_config(true);
        let msg = message()
            .with_html("<p>Body</p>")
            .with_attachment(EmailAttachment {
                filename: "schedule.csv".to_string(),
                content_type: "text/csv".to_string(),
                content: b"a,b\n".to_vec(),
            });

        let json = serde_json::to_value(build_payload(&config, &msg)).unwrap();
        assert_eq!(json["from"]["email"], "noreply@advisory.test");
        assert_eq!(json["to"][0]["email"], "jane@example.com");
        assert_eq!(json["to"][0]["name"], "Jane");
        assert_eq!(json["html"], "<p>Body</p>");
        assert_eq!(json["attachments"][0]["filename"], "schedule.csv");
        assert_eq!(json["attachments"][0]["content"], "YSxiCg==");
    }

    #[test]
    fn test_payload_omits_empty_parts() {
        let config = console_config(true);
        let msg = EmailMessage::new("a@b.c", "s", "t");
        let json = serde_json::to_value(build_payload(&config, &msg)).unwrap();
        assert!(json.get("html").is_none());
        assert!(json.get("attachments").is_none());
        assert!(json["to"][0].get("name").is_none());
    }
}
