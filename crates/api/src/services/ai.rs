//! Client for an OpenAI-compatible chat completions endpoint.
//!
//! One call per summary, no retry. The request timeout comes from `ai.timeout_secs`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use domain::calculators::ToolKind;
use domain::services::{build_messages, ChatMessage};
use metrics::histogram;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AiConfig;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI service not configured")]
    NotConfigured,

    #[error("AI request timed out")]
    Timeout,

    #[error("AI request failed: {0}")]
    Request(String),

    #[error("AI provider returned status {status}")]
    Status { status: u16 },

    #[error("AI provider returned no content")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct AiClient {
    config: Arc<AiConfig>,
    client: reqwest::Client,
}

impl std::fmt::Debug for AiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiClient")
            .field("model", &self.config.model)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AiClient {
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AiError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'))
    }

    /// Plain-language summary of a calculator result.
    pub async fn summarize(
        &self,
        tool: ToolKind,
        result: &serde_json::Value,
        question: Option<&str>,
    ) -> Result<String, AiError> {
        if !self.is_configured() {
            return Err(AiError::NotConfigured);
        }

        let messages = build_messages(tool, result, question);
        let body = CompletionRequest {
            model: &self.config.model,
            messages: &messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        histogram!("ai_request_duration_seconds").record(start.elapsed().as_secs_f64());

        if !status.is_success() {
            warn!(status = status.as_u16(), tool = %tool, "AI provider returned an error");
            return Err(AiError::Status {
                status: status.as_u16(),
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::Request(format!("Invalid AI response: {}", e)))?;

        let summary = first_content(completion)?;
        info!(tool = %tool, chars = summary.len(), "AI summary generated");
        Ok(summary)
    }
}

fn first_content(completion: CompletionResponse) -> Result<String, AiError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(AiError::EmptyResponse)
}
