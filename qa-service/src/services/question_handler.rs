//! Orchestration of a single `/ask` request.
//!
//! Validate, ask the provider once, store the pair, answer. Nothing is
//! written unless the provider produced an answer.

use crate::models::{AskResponse, NewQaRecord};
use crate::services::database::QaStore;
use crate::services::metrics::{record_provider_error, record_provider_latency, record_qa_stored};
use crate::services::providers::{AnswerProvider, ProviderError, FETCH_ERROR_MESSAGE};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::instrument;

pub const QUESTION_REQUIRED_MESSAGE: &str = "Question is required!";

pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "You have exceeded your OpenAI quota. Please check your plan and billing details.";

/// Why an `/ask` request failed.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("{}", QUESTION_REQUIRED_MESSAGE)]
    Validation,

    #[error("{}", QUOTA_EXCEEDED_MESSAGE)]
    QuotaExceeded,

    #[error("{}", FETCH_ERROR_MESSAGE)]
    Provider,

    #[error("Failed to store question and answer: {0}")]
    Storage(#[source] AppError),
}

impl From<AskError> for AppError {
    fn from(err: AskError) -> Self {
        match err {
            AskError::Validation => {
                AppError::BadRequest(anyhow::anyhow!(QUESTION_REQUIRED_MESSAGE))
            }
            AskError::QuotaExceeded => {
                AppError::TooManyRequests(QUOTA_EXCEEDED_MESSAGE.to_string(), None)
            }
            AskError::Provider => AppError::UpstreamError(FETCH_ERROR_MESSAGE.to_string()),
            AskError::Storage(inner) => inner,
        }
    }
}

/// Handles questions against an injected provider and store.
#[derive(Clone)]
pub struct QuestionHandler {
    provider: Arc<dyn AnswerProvider>,
    store: Arc<dyn QaStore>,
}

impl QuestionHandler {
    pub fn new(provider: Arc<dyn AnswerProvider>, store: Arc<dyn QaStore>) -> Self {
        Self { provider, store }
    }

    /// Answer `question` and persist the pair.
    ///
    /// The emptiness check is on the raw value; whitespace-only questions
    /// are passed through.
    #[instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn handle(&self, question: Option<&str>) -> Result<AskResponse, AskError> {
        let question = match question {
            Some(q) if !q.is_empty() => q,
            _ => {
                tracing::warn!("Rejected request without a question");
                return Err(AskError::Validation);
            }
        };

        let provider = self.provider.name();
        let start = Instant::now();
        let outcome = self.provider.get_answer(question).await;
        record_provider_latency(provider, self.provider.model(), start.elapsed().as_secs_f64());

        let answer = outcome.map_err(|e| {
            record_provider_error(provider, e.kind());
            match e {
                ProviderError::RateLimited(message) => {
                    tracing::error!(upstream_message = %message, "Quota exceeded");
                    AskError::QuotaExceeded
                }
                ProviderError::Upstream => {
                    tracing::error!("Provider failed to answer");
                    AskError::Provider
                }
            }
        })?;

        let record = self
            .store
            .insert(&NewQaRecord::new(question, answer))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to store QA record");
                AskError::Storage(e)
            })?;

        record_qa_stored(provider);
        tracing::info!(qa_id = record.id, "Question answered");

        Ok(AskResponse::from(record))
    }
}
