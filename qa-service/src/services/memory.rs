//! In-memory QA store, used by tests and local runs without PostgreSQL.

use super::database::QaStore;
use crate::models::{NewQaRecord, QaRecord};
use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::RwLock;

/// Append-only vector of records with an incrementing id.
#[derive(Default)]
pub struct InMemoryQaStore {
    records: RwLock<Vec<QaRecord>>,
}

impl InMemoryQaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, oldest first.
    pub async fn all(&self) -> Vec<QaRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl QaStore for InMemoryQaStore {
    async fn insert(&self, record: &NewQaRecord) -> Result<QaRecord, AppError> {
        if record.question.is_empty() || record.answer.is_empty() {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "question and answer must be non-empty"
            )));
        }

        let mut records = self.records.write().await;
        let stored = QaRecord {
            id: records.len() as i64 + 1,
            question: record.question.clone(),
            answer: record.answer.clone(),
        };
        records.push(stored.clone());

        Ok(stored)
    }

    async fn find_by_question(&self, question: &str) -> Result<Vec<QaRecord>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.question == question)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.records.read().await.len() as i64)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
