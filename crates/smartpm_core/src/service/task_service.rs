//! Task use-case service for direct user edits.

use crate::model::task::{Task, TaskFields, TaskId, TaskStatus};
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Use-case service wrapper for task CRUD operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task from manual input.
    ///
    /// Dependencies are stored without existence or cycle checks.
    pub fn create_task(&self, fields: &TaskFields) -> RepoResult<Task> {
        let task = self.repo.create_task(fields)?;
        info!(
            "event=task_create module=service status=ok task_id={} assigned_project={}",
            task.id,
            task.fields.project_id.is_some()
        );
        Ok(task)
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    pub fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(query)
    }

    /// Replaces every editable field; identity and `created_at` are kept.
    pub fn update_task(&self, id: TaskId, fields: &TaskFields) -> RepoResult<Task> {
        self.repo.update_task(id, fields)
    }

    /// Moves one task to another workflow state.
    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<Task> {
        let mut task = self
            .repo
            .get_task(id)?
            .ok_or(RepoError::TaskNotFound(id))?;
        task.fields.status = status;
        self.repo.update_task(id, &task.fields)
    }

    pub fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.repo.delete_task(id)
    }
}
