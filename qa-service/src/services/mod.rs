pub mod database;
pub mod memory;
pub mod metrics;
pub mod providers;
pub mod question_handler;

pub use database::{Database, QaStore};
pub use memory::InMemoryQaStore;
pub use metrics::{get_metrics, init_metrics};
pub use question_handler::{AskError, QuestionHandler};
