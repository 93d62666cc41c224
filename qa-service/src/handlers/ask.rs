use crate::{
    models::{AskRequest, AskResponse},
    utils::ValidatedJson,
    AppState,
};
use axum::{extract::State, Json};
use service_core::error::AppError;

/// `POST /ask`: answer a question and persist the pair.
pub async fn ask(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let response = state
        .question_handler
        .handle(req.question.as_deref())
        .await?;

    Ok(Json(response))
}
