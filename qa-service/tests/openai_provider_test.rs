mod common;

use axum::http::StatusCode;
use common::{ask_request, completion, json_body, question_body, spawn_mock_openai, test_config};
use qa_service::router;
use qa_service::services::providers::openai::OpenAiProvider;
use qa_service::services::providers::{AnswerProvider, ProviderError};
use qa_service::services::{init_metrics, InMemoryQaStore, QaStore};
use qa_service::startup::AppState;
use std::sync::Arc;
use tower::ServiceExt;

fn provider(base_url: &str) -> OpenAiProvider {
    OpenAiProvider::new(test_config(base_url).openai.provider_config()).unwrap()
}

#[tokio::test]
async fn returns_first_choice_content() {
    let base_url = spawn_mock_openai(
        StatusCode::OK,
        completion("  AI stands for Artificial Intelligence.\n"),
    )
    .await;

    let answer = provider(&base_url).get_answer("What is AI?").await.unwrap();

    assert_eq!(answer, "AI stands for Artificial Intelligence.");
}

#[tokio::test]
async fn quota_response_is_rate_limited() {
    let base_url = spawn_mock_openai(
        StatusCode::TOO_MANY_REQUESTS,
        serde_json::json!({
            "error": {
                "message": "You exceeded your current quota",
                "type": "insufficient_quota",
                "code": "insufficient_quota"
            }
        }),
    )
    .await;

    let err = provider(&base_url).get_answer("What is AI?").await.unwrap_err();

    assert_eq!(
        err,
        ProviderError::RateLimited("You exceeded your current quota".to_string())
    );
}

#[tokio::test]
async fn server_error_is_upstream() {
    let base_url = spawn_mock_openai(
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({ "error": { "message": "boom" } }),
    )
    .await;

    let err = provider(&base_url).get_answer("What is AI?").await.unwrap_err();

    assert_eq!(err, ProviderError::Upstream);
}

#[tokio::test]
async fn missing_choices_is_upstream() {
    let base_url = spawn_mock_openai(StatusCode::OK, serde_json::json!({ "choices": [] })).await;

    let err = provider(&base_url).get_answer("What is AI?").await.unwrap_err();

    assert_eq!(err, ProviderError::Upstream);
}

#[tokio::test]
async fn unreachable_endpoint_is_upstream() {
    let err = provider("http://127.0.0.1:1")
        .get_answer("What is AI?")
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::Upstream);
}

#[tokio::test]
async fn ask_end_to_end_through_openai_provider() {
    init_metrics();
    let base_url = spawn_mock_openai(StatusCode::OK, completion("Hello from the model")).await;
    let store = Arc::new(InMemoryQaStore::new());
    let state = AppState::new(
        test_config(&base_url),
        Arc::new(provider(&base_url)),
        store.clone(),
    );

    let response = router(state)
        .oneshot(ask_request(question_body("Say hello")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "question": "Say hello", "answer": "Hello from the model" })
    );
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn ask_end_to_end_quota_exhaustion() {
    init_metrics();
    let base_url = spawn_mock_openai(
        StatusCode::TOO_MANY_REQUESTS,
        serde_json::json!({ "error": { "message": "quota", "code": "insufficient_quota" } }),
    )
    .await;
    let store = Arc::new(InMemoryQaStore::new());
    let state = AppState::new(
        test_config(&base_url),
        Arc::new(provider(&base_url)),
        store.clone(),
    );

    let response = router(state)
        .oneshot(ask_request(question_body("What is AI?")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(store.count().await.unwrap(), 0);
}
