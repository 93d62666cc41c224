//! Question/answer records and the `/ask` wire types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Longest question accepted, in characters.
pub const MAX_QUESTION_CHARS: u64 = 4000;

/// A persisted question and the answer the provider gave for it.
///
/// Rows are written once and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct QaRecord {
    /// Store-assigned, monotonically increasing identifier.
    pub id: i64,

    pub question: String,

    pub answer: String,
}

/// Insert payload for a QA record; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQaRecord {
    pub question: String,
    pub answer: String,
}

impl NewQaRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Body of `POST /ask`.
///
/// `question` is optional at the wire level so that a missing field and an
/// empty string are reported the same way.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(
        max = MAX_QUESTION_CHARS,
        message = "Question must be at most 4000 characters"
    ))]
    pub question: Option<String>,
}

/// Body of a successful `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
}

impl From<QaRecord> for AskResponse {
    fn from(record: QaRecord) -> Self {
        Self {
            question: record.question,
            answer: record.answer,
        }
    }
}
