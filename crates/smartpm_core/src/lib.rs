//! Core domain logic for SmartPM.
//! This crate is the single source of truth for project/task invariants and
//! for the feature-to-task decomposition assistant.

pub mod assistant;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use assistant::conversation::{
    assistant_reply_text, ConversationError, ConversationLog, ConversationTurn, Speaker, TurnId,
};
pub use assistant::decomposer::{classify, decompose, decompose_with_domain, Decomposition};
pub use assistant::materializer::{
    BatchReport, DraftCreationFailed, MaterializeRejection, MaterializeResult, TaskMaterializer,
};
pub use assistant::templates::Domain;
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::level::{Priority, RiskLevel};
pub use model::project::{Project, ProjectFields, ProjectId, ProjectStatus, ProjectValidationError};
pub use model::task::{Task, TaskDraft, TaskFields, TaskId, TaskStatus, TaskValidationError};
pub use notify::{LogNotifier, Notifier, NotifyKind};
pub use repo::project_repo::{ProjectLister, ProjectRepository, SqliteProjectRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskCreator, TaskListQuery, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use service::assistant_service::{AssistantError, AssistantService, Exchange};
pub use service::project_service::{ProjectService, ProjectSummary};
pub use service::task_service::TaskService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
