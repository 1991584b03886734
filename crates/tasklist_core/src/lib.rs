//! Core domain logic for the tasklist tracker.
//! This crate owns classification, persistence and list projections;
//! presentation layers call into `TaskService`.

pub mod classify;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use classify::{
    Classification, ClassificationError, Classifier, GeminiGenerator, GenerationError,
    TextGenerator,
};
pub use config::{AppConfig, ClassifierConfig, ConfigError, DbConfig, LoggingConfig};
pub use db::{ConnectionPool, DbError, DbTarget};
pub use logging::{default_log_level, init_logging};
pub use model::task::{
    validate_description, Category, NewTask, Priority, Task, TaskId, TaskValidationError,
};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::task_service::{ServiceResult, TaskService, TaskServiceError};
pub use service::view::{arrange_tasks, SortKey, TaskListQuery, TaskStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
