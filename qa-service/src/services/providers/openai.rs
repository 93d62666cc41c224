//! OpenAI answer provider.
//!
//! Sends one chat completion per question to the OpenAI REST API
//! (`POST {base_url}/chat/completions`) and returns the first choice.

use super::{AnswerProvider, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// System instruction sent ahead of every question.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// OpenAI chat completion provider.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, client })
    }

    fn chat_completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, question: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
        }
    }
}

#[async_trait]
impl AnswerProvider for OpenAiProvider {
    #[instrument(
        skip(self, question),
        fields(model = %self.config.model, question_len = question.len())
    )]
    async fn get_answer(&self, question: &str) -> Result<String, ProviderError> {
        let request = self.build_request(question);

        tracing::debug!("Sending chat completion request to OpenAI");

        let response = self
            .client
            .post(self.chat_completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, timeout = e.is_timeout(), "OpenAI request failed");
                ProviderError::Upstream
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = upstream_error_message(&error_text);

            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!(%status, message = %message, "OpenAI quota exceeded");
                return Err(ProviderError::RateLimited(message));
            }

            tracing::error!(%status, message = %message, "OpenAI API error");
            return Err(ProviderError::Upstream);
        }

        let api_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse OpenAI response");
            ProviderError::Upstream
        })?;

        extract_answer(api_response).ok_or_else(|| {
            tracing::error!("OpenAI response did not contain an answer");
            ProviderError::Upstream
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// First choice's content, trimmed. `None` when there is nothing to return.
fn extract_answer(response: ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|answer| !answer.is_empty())
}

/// Message from an OpenAI error body, or the raw body when it has none.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
