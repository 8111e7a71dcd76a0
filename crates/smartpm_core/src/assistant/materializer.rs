//! Accepted-draft materialization.
//!
//! # Responsibility
//! - Resolve the target project for a batch of accepted drafts.
//! - Issue one task creation per draft, in draft order.
//! - Report the aggregate outcome once through the notifier.
//!
//! # Invariants
//! - No creation is issued unless a listed project was resolved, so a
//!   materialized task never references a missing project.
//! - A failed creation never stops the remaining drafts (best-effort batch,
//!   no rollback).
//! - Exactly one notification per call that reaches a verdict.

use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskDraft, TaskFields, TaskId};
use crate::notify::{Notifier, NotifyKind};
use crate::repo::project_repo::ProjectLister;
use crate::repo::task_repo::TaskCreator;
use crate::repo::RepoResult;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a batch was refused before any creation was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeRejection {
    /// No explicit target and no project exists.
    NoProjectAvailable,
    /// The explicit target is not among the listed projects.
    ProjectNotFound(ProjectId),
}

impl Display for MaterializeRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProjectAvailable => write!(
                f,
                "No project available. Create a project before adding generated tasks."
            ),
            Self::ProjectNotFound(id) => write!(f, "Project {id} was not found"),
        }
    }
}

impl Error for MaterializeRejection {}

/// One draft whose creation request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftCreationFailed {
    /// Zero-based position in the submitted draft list.
    pub index: usize,
    pub reason: String,
}

impl Display for DraftCreationFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "draft #{} was not created: {}", self.index, self.reason)
    }
}

impl Error for DraftCreationFailed {}

/// Aggregate outcome of one issued batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub project_id: ProjectId,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Created tasks in draft order.
    pub created: Vec<Task>,
    pub failures: Vec<DraftCreationFailed>,
}

impl BatchReport {
    pub fn created_ids(&self) -> Vec<TaskId> {
        self.created.iter().map(|task| task.id).collect()
    }

    /// Aggregate user-facing message for this batch.
    pub fn message(&self) -> String {
        if self.failed == 0 {
            format!("Created {} tasks successfully", self.succeeded)
        } else {
            format!(
                "Created {} of {} tasks; {} failed",
                self.succeeded, self.attempted, self.failed
            )
        }
    }
}

/// Result of one materialization request.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterializeResult {
    Rejected(MaterializeRejection),
    Completed(BatchReport),
}

/// Turns accepted drafts into persisted tasks.
pub struct TaskMaterializer<P, T, N> {
    projects: P,
    tasks: T,
    notifier: N,
}

impl<P: ProjectLister, T: TaskCreator, N: Notifier> TaskMaterializer<P, T, N> {
    pub fn new(projects: P, tasks: T, notifier: N) -> Self {
        Self {
            projects,
            tasks,
            notifier,
        }
    }

    /// Materializes `drafts` into `target`, or into the first listed project
    /// when no target is given.
    ///
    /// # Errors
    /// - Returns the storage error when projects cannot be listed; an error
    ///   notification is emitted and nothing is created.
    pub fn materialize(
        &self,
        drafts: &[TaskDraft],
        target: Option<ProjectId>,
    ) -> RepoResult<MaterializeResult> {
        let projects = match self.projects.list_projects() {
            Ok(projects) => projects,
            Err(err) => {
                warn!(
                    "event=materialize_batch module=assistant status=error error_code=list_projects_failed error={}",
                    err
                );
                self.notifier
                    .notify(NotifyKind::Error, "Could not load projects");
                return Err(err);
            }
        };

        let project_id = match resolve_target(&projects, target) {
            Ok(project_id) => project_id,
            Err(rejection) => {
                warn!(
                    "event=materialize_batch module=assistant status=rejected drafts={} reason={:?}",
                    drafts.len(),
                    rejection
                );
                self.notifier
                    .notify(NotifyKind::Error, &rejection.to_string());
                return Ok(MaterializeResult::Rejected(rejection));
            }
        };

        let mut created = Vec::with_capacity(drafts.len());
        let mut failures = Vec::new();
        for (index, draft) in drafts.iter().enumerate() {
            let fields = TaskFields::from_draft(draft.clone(), Some(project_id));
            match self.tasks.create_task(&fields) {
                Ok(task) => {
                    info!(
                        "event=task_create module=assistant status=ok project_id={} task_id={} index={}",
                        project_id, task.id, index
                    );
                    created.push(task);
                }
                Err(err) => {
                    warn!(
                        "event=task_create module=assistant status=error project_id={} index={} error={}",
                        project_id, index, err
                    );
                    failures.push(DraftCreationFailed {
                        index,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let report = BatchReport {
            project_id,
            attempted: drafts.len(),
            succeeded: created.len(),
            failed: failures.len(),
            created,
            failures,
        };

        info!(
            "event=materialize_batch module=assistant status=ok project_id={} attempted={} succeeded={} failed={}",
            report.project_id, report.attempted, report.succeeded, report.failed
        );
        let kind = if report.failed == 0 {
            NotifyKind::Success
        } else {
            NotifyKind::Error
        };
        self.notifier.notify(kind, &report.message());

        Ok(MaterializeResult::Completed(report))
    }
}

fn resolve_target(
    projects: &[Project],
    target: Option<ProjectId>,
) -> Result<ProjectId, MaterializeRejection> {
    match target {
        Some(id) if projects.iter().any(|project| project.id == id) => Ok(id),
        Some(id) => Err(MaterializeRejection::ProjectNotFound(id)),
        None => projects
            .first()
            .map(|project| project.id)
            .ok_or(MaterializeRejection::NoProjectAvailable),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_target, BatchReport, MaterializeRejection};
    use crate::model::project::{Project, ProjectFields};
    use uuid::Uuid;

    fn project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            fields: ProjectFields::new(name),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn falls_back_to_first_listed_project() {
        let projects = vec![project("first"), project("second")];
        assert_eq!(resolve_target(&projects, None), Ok(projects[0].id));
    }

    #[test]
    fn explicit_target_wins_over_listing_order() {
        let projects = vec![project("first"), project("second")];
        assert_eq!(
            resolve_target(&projects, Some(projects[1].id)),
            Ok(projects[1].id)
        );
    }

    #[test]
    fn empty_listing_without_target_is_rejected() {
        assert_eq!(
            resolve_target(&[], None),
            Err(MaterializeRejection::NoProjectAvailable)
        );
    }

    #[test]
    fn unknown_explicit_target_is_rejected() {
        let missing = Uuid::new_v4();
        assert_eq!(
            resolve_target(&[project("only")], Some(missing)),
            Err(MaterializeRejection::ProjectNotFound(missing))
        );
    }

    #[test]
    fn report_message_distinguishes_partial_failure() {
        let mut report = BatchReport {
            project_id: Uuid::new_v4(),
            attempted: 4,
            succeeded: 4,
            failed: 0,
            created: Vec::new(),
            failures: Vec::new(),
        };
        assert_eq!(report.message(), "Created 4 tasks successfully");
        report.succeeded = 3;
        report.failed = 1;
        assert_eq!(report.message(), "Created 3 of 4 tasks; 1 failed");
    }
}
