//! Mock provider implementation for testing.

use super::{AnswerProvider, ProviderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

enum Script {
    /// Every call gets the same outcome.
    Always(Result<String, ProviderError>),
    /// Calls consume outcomes in order; an exhausted script fails upstream.
    Sequence(VecDeque<Result<String, ProviderError>>),
}

/// Mock answer provider with scripted outcomes.
///
/// Records every question it receives so tests can assert on what would
/// have been sent upstream.
pub struct MockAnswerProvider {
    script: Mutex<Script>,
    questions: Mutex<Vec<String>>,
}

impl MockAnswerProvider {
    /// Always answer with `answer`.
    pub fn answering(answer: impl Into<String>) -> Self {
        Self::with_script(Script::Always(Ok(answer.into())))
    }

    /// Always fail with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::with_script(Script::Always(Err(error)))
    }

    /// Return `outcomes` one per call, in order.
    pub fn scripted(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        Self::with_script(Script::Sequence(outcomes.into()))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Questions received so far, oldest first.
    pub async fn questions(&self) -> Vec<String> {
        self.questions.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.questions.lock().await.len()
    }
}

#[async_trait]
impl AnswerProvider for MockAnswerProvider {
    async fn get_answer(&self, question: &str) -> Result<String, ProviderError> {
        self.questions.lock().await.push(question.to_string());

        let outcome = match &mut *self.script.lock().await {
            Script::Always(outcome) => outcome.clone(),
            Script::Sequence(outcomes) => outcomes
                .pop_front()
                .unwrap_or(Err(ProviderError::Upstream)),
        };

        outcome.map(|answer| answer.trim().to_string())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
