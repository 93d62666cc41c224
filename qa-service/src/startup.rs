//! Application startup and lifecycle management.

use crate::config::QaConfig;
use crate::handlers::{
    ask, health_check, method_not_allowed, metrics_handler, not_found, readiness_check,
};
use crate::middleware::metrics::metrics_middleware;
use crate::services::providers::openai::OpenAiProvider;
use crate::services::providers::AnswerProvider;
use crate::services::{init_metrics, Database, QaStore, QuestionHandler};
use axum::{body::Body, middleware, routing::get, routing::post, Router};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::tracing::{make_request_span, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: QaConfig,
    pub question_handler: QuestionHandler,
    pub store: Arc<dyn QaStore>,
}

impl AppState {
    pub fn new(
        config: QaConfig,
        provider: Arc<dyn AnswerProvider>,
        store: Arc<dyn QaStore>,
    ) -> Self {
        Self {
            config,
            question_handler: QuestionHandler::new(provider, store.clone()),
            store,
        }
    }
}

/// Build the HTTP router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask).fallback(method_not_allowed))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    listener: TcpListener,
    state: AppState,
    database: Option<Database>,
}

impl Application {
    /// Connect to PostgreSQL, run migrations and wire the OpenAI provider.
    pub async fn build(config: QaConfig) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            e
        })?;

        let provider = OpenAiProvider::new(config.openai.provider_config()).map_err(|e| {
            tracing::error!(error = %e, "Failed to build OpenAI client");
            AppError::ConfigError(anyhow::anyhow!("Failed to build OpenAI client: {}", e))
        })?;

        tracing::info!(model = %config.openai.model, "Initialized OpenAI provider");

        let state = AppState::new(config, Arc::new(provider), Arc::new(db.clone()));

        let mut app = Self::build_with_state(state).await?;
        app.database = Some(db);
        Ok(app)
    }

    /// Bind the listener for an already assembled state.
    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        init_metrics();

        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = listener.local_addr()?.port();

        tracing::info!(http_port = http_port, "QA service listener bound");

        Ok(Self {
            http_port,
            listener,
            state,
            database: None,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// The PostgreSQL pool, when built with [`Application::build`].
    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let service_name = self.state.config.service_name.clone();
        let environment = self.state.config.environment;
        let app = router(self.state);

        tracing::info!(
            service = %service_name,
            environment = environment.as_str(),
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.http_port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, app).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
