use crate::services::providers::openai::{OpenAiConfig, OPENAI_API_BASE};
use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_env_parsed, Environment};
use service_core::error::AppError;
use std::time::Duration;

/// Used when `DATABASE_URL` is not set outside production.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://postgres:1234@db:5432/dbname";

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct QaConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub openai: OpenAiSettings,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OpenAiSettings {
    /// Provider configuration for [`crate::services::providers::openai::OpenAiProvider`].
    pub fn provider_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl QaConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let environment = Environment::from_env()?;
        let is_prod = environment.is_prod();

        Ok(QaConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("qa-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: std::env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: Secret::new(get_env("DATABASE_URL", Some(DEFAULT_DATABASE_URL), is_prod)?),
                max_connections: get_env_parsed("DATABASE_MAX_CONNECTIONS", 10, is_prod)?,
                min_connections: get_env_parsed("DATABASE_MIN_CONNECTIONS", 1, is_prod)?,
            },
            openai: OpenAiSettings {
                api_key: Secret::new(get_env("OPENAI_API_KEY", None, is_prod)?),
                base_url: get_env("OPENAI_BASE_URL", Some(OPENAI_API_BASE), is_prod)?,
                model: get_env("OPENAI_MODEL", Some(DEFAULT_OPENAI_MODEL), is_prod)?,
                timeout_secs: get_env_parsed(
                    "OPENAI_TIMEOUT_SECS",
                    DEFAULT_OPENAI_TIMEOUT_SECS,
                    is_prod,
                )?,
            },
        })
    }
}
