//! HTTP handlers for the QA service.

pub mod ask;
pub mod fallback;
pub mod health;

pub use ask::ask;
pub use fallback::{method_not_allowed, not_found};
pub use health::{health_check, metrics_handler, readiness_check};
