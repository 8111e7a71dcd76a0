//! Project use-case service.
//!
//! # Responsibility
//! - Provide create/update/delete/list entry points for projects.
//! - Join per-project task counts for list views.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Deleting a project deletes its tasks; the count removed is logged.

use crate::model::project::{Project, ProjectFields, ProjectId, ProjectStatus};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Project row enriched for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub project: Project,
    pub task_count: u64,
}

/// Use-case service over project and task repositories.
pub struct ProjectService<P: ProjectRepository, T: TaskRepository> {
    projects: P,
    tasks: T,
}

impl<P: ProjectRepository, T: TaskRepository> ProjectService<P, T> {
    pub fn new(projects: P, tasks: T) -> Self {
        Self { projects, tasks }
    }

    /// Creates one project.
    pub fn create_project(&self, fields: &ProjectFields) -> RepoResult<Project> {
        let project = self.projects.create_project(fields)?;
        info!(
            "event=project_create module=service status=ok project_id={}",
            project.id
        );
        Ok(project)
    }

    pub fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        self.projects.get_project(id)
    }

    /// Lists projects in insertion order.
    pub fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.projects.list_projects()
    }

    /// Lists projects in insertion order with their task counts.
    pub fn list_summaries(&self) -> RepoResult<Vec<ProjectSummary>> {
        self.projects
            .list_projects()?
            .into_iter()
            .map(|project| {
                let task_count = self.tasks.count_tasks(project.id)?;
                Ok(ProjectSummary {
                    project,
                    task_count,
                })
            })
            .collect()
    }

    /// Replaces all writable fields of one project.
    pub fn update_project(&self, id: ProjectId, fields: &ProjectFields) -> RepoResult<Project> {
        self.projects.update_project(id, fields)
    }

    /// Changes only the lifecycle status.
    pub fn set_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<Project> {
        let mut project = self
            .projects
            .get_project(id)?
            .ok_or(RepoError::ProjectNotFound(id))?;
        project.fields.status = status;
        self.projects.update_project(id, &project.fields)
    }

    /// Deletes one project and, through the storage cascade, its tasks.
    pub fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let task_count = self.tasks.count_tasks(id)?;
        self.projects.delete_project(id)?;
        info!(
            "event=project_delete module=service status=ok project_id={} cascaded_tasks={}",
            id, task_count
        );
        Ok(())
    }
}
