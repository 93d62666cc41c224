//! Database service for qa-service.
//!
//! [`QaStore`] is the persistence seam used by the question handler;
//! [`Database`] implements it on PostgreSQL.

use crate::models::{NewQaRecord, QaRecord};
use crate::services::metrics::{record_db_error, record_db_operation};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Storage for question/answer records. Records are append-only.
#[async_trait]
pub trait QaStore: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    async fn insert(&self, record: &NewQaRecord) -> Result<QaRecord, AppError>;

    /// All records with exactly this question text, oldest first.
    async fn find_by_question(&self, question: &str) -> Result<Vec<QaRecord>, AppError>;

    /// Number of stored records.
    async fn count(&self) -> Result<i64, AppError>;

    /// Check the store is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "qa-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Time a query and count failures under `operation`.
async fn observed<T, F>(operation: &str, query: F) -> Result<T, sqlx::Error>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    let start = Instant::now();
    let result = query.await;
    record_db_operation(operation, start.elapsed().as_secs_f64());
    if result.is_err() {
        record_db_error(operation);
    }
    result
}

#[async_trait]
impl QaStore for Database {
    #[instrument(skip(self, record), fields(question_len = record.question.len()))]
    async fn insert(&self, record: &NewQaRecord) -> Result<QaRecord, AppError> {
        let stored = observed(
            "insert_qa_record",
            sqlx::query_as::<_, QaRecord>(
                r#"
                INSERT INTO questions_answers (question, answer)
                VALUES ($1, $2)
                RETURNING id, question, answer
                "#,
            )
            .bind(&record.question)
            .bind(&record.answer)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert QA record: {}", e))
        })?;

        info!(qa_id = stored.id, "QA record stored");

        Ok(stored)
    }

    #[instrument(skip(self, question))]
    async fn find_by_question(&self, question: &str) -> Result<Vec<QaRecord>, AppError> {
        observed(
            "find_qa_by_question",
            sqlx::query_as::<_, QaRecord>(
                r#"
                SELECT id, question, answer
                FROM questions_answers
                WHERE question = $1
                ORDER BY id
                "#,
            )
            .bind(question)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to query QA records: {}", e)))
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<i64, AppError> {
        observed(
            "count_qa_records",
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions_answers")
                .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count QA records: {}", e)))
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        observed("health_check", sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}
