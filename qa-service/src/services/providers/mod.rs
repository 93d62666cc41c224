//! Answer provider abstractions and implementations.
//!
//! The question handler only sees the [`AnswerProvider`] trait, so the
//! OpenAI backend can be swapped for the scripted mock in tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Generic message for provider failures other than rate limiting.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching data from OpenAI";

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Upstream rate limit or quota exhaustion. Carries the upstream message
    /// for server-side logs.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other failure. Upstream detail is logged by the provider and not
    /// carried here.
    #[error("Error fetching data from OpenAI")]
    Upstream,
}

impl ProviderError {
    /// Metric label for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::Upstream => "upstream",
        }
    }
}

/// Trait for question answering backends.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Answer a single question. The returned text is trimmed and non-empty.
    async fn get_answer(&self, question: &str) -> Result<String, ProviderError>;

    /// Provider name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Model identifier used in logs and metrics.
    fn model(&self) -> &str;
}
