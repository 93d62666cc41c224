//! Domain models for the QA service.

pub mod qa_record;

pub use qa_record::{AskRequest, AskResponse, NewQaRecord, QaRecord, MAX_QUESTION_CHARS};
