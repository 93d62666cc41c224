use axum::http::{Method, Uri};
use service_core::error::AppError;

pub async fn not_found(method: Method, uri: Uri) -> AppError {
    tracing::debug!(%method, %uri, "No route matched");
    AppError::NotFound(anyhow::anyhow!("Route not found"))
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    tracing::debug!(%method, %uri, "Method not allowed");
    AppError::MethodNotAllowed
}
