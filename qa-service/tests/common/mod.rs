//! Shared setup for qa-service integration tests.

#![allow(dead_code)]

use axum::{body::Body, http::Request, http::StatusCode, routing::post, Json, Router};
use http_body_util::BodyExt;
use qa_service::config::{DatabaseConfig, OpenAiSettings, QaConfig};
use qa_service::services::providers::mock::MockAnswerProvider;
use qa_service::services::{init_metrics, Database, InMemoryQaStore};
use qa_service::startup::AppState;
use secrecy::Secret;
use service_core::config::{Config as CoreConfig, Environment};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static SCHEMA_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Config for tests; nothing here is read from the environment.
pub fn test_config(openai_base_url: &str) -> QaConfig {
    QaConfig {
        common: CoreConfig { port: 0 },
        environment: Environment::Test,
        service_name: "qa-service-test".to_string(),
        log_level: "warn".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: Secret::new("postgresql://unused".to_string()),
            max_connections: 2,
            min_connections: 1,
        },
        openai: OpenAiSettings {
            api_key: Secret::new("sk-test".to_string()),
            base_url: openai_base_url.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 5,
        },
    }
}

/// State backed by a mock provider and an in-memory store.
pub fn mock_state(
    provider: MockAnswerProvider,
) -> (AppState, Arc<MockAnswerProvider>, Arc<InMemoryQaStore>) {
    init_metrics();
    let provider = Arc::new(provider);
    let store = Arc::new(InMemoryQaStore::new());
    let state = AppState::new(
        test_config("http://127.0.0.1:1"),
        provider.clone(),
        store.clone(),
    );
    (state, provider, store)
}

pub fn ask_request(body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub fn question_body(question: &str) -> String {
    serde_json::json!({ "question": question }).to_string()
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve `POST /chat/completions` locally, always replying with `status`
/// and `body`. Returns the base URL to hand to the provider.
pub async fn spawn_mock_openai(status: StatusCode, body: serde_json::Value) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn completion(answer: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": answer } }
        ]
    })
}

/// `TEST_DATABASE_URL`, when PostgreSQL tests should run.
pub fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok()
}

/// A migrated PostgreSQL store in its own schema.
pub struct TestDatabase {
    pub db: Database,
    base_url: String,
    schema_name: String,
}

impl TestDatabase {
    /// Create a fresh schema, point the pool's search path at it and run
    /// migrations.
    pub async fn spawn(base_url: &str) -> Self {
        let counter = SCHEMA_COUNTER.fetch_add(1, Ordering::SeqCst);
        let schema_name = format!("test_qa_{}_{}", std::process::id(), counter);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(base_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema_name))
            .execute(&pool)
            .await
            .ok();
        sqlx::query(&format!("CREATE SCHEMA {}", schema_name))
            .execute(&pool)
            .await
            .expect("Failed to create test schema");
        pool.close().await;

        let separator = if base_url.contains('?') { "&" } else { "?" };
        let url = format!(
            "{}{}options=-c search_path%3D{}",
            base_url, separator, schema_name
        );

        let db = Database::new(&url, 2, 1)
            .await
            .expect("Failed to connect to test database");
        db.run_migrations().await.expect("Failed to run migrations");

        Self {
            db,
            base_url: base_url.to_string(),
            schema_name,
        }
    }

    /// Close the pool and drop the schema.
    pub async fn cleanup(self) {
        self.db.close().await;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.base_url)
            .await
            .ok();

        if let Some(pool) = pool {
            let _ = sqlx::query(&format!(
                "DROP SCHEMA IF EXISTS {} CASCADE",
                self.schema_name
            ))
            .execute(&pool)
            .await;
            pool.close().await;
        }
    }
}
