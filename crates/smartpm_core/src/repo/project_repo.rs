//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `projects` table.
//! - Expose `list_projects` in insertion order; the task materializer relies
//!   on the first listed project as its fallback target.
//!
//! # Invariants
//! - Write paths call `ProjectFields::validate()` before SQL mutations.
//! - `delete_project` removes every task of the project (FK cascade).
//! - `updated_at` never moves backwards.

use crate::model::level::RiskLevel;
use crate::model::project::{Project, ProjectFields, ProjectId, ProjectStatus};
use crate::repo::{
    date_to_db, invalid_enum, parse_date, parse_uuid, RepoError, RepoResult, NOW_MS_SQL,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    status,
    risk_level,
    due_date,
    created_at,
    updated_at
FROM projects";

/// Read contract the task materializer needs to resolve a target project.
pub trait ProjectLister {
    /// Lists every project in insertion order.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
}

/// Repository interface for project CRUD operations.
pub trait ProjectRepository: ProjectLister {
    /// Inserts a new project and returns the stored record.
    fn create_project(&self, fields: &ProjectFields) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Replaces all writable fields of one project.
    fn update_project(&self, id: ProjectId, fields: &ProjectFields) -> RepoResult<Project>;
    /// Deletes one project together with its tasks.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

impl<T: ProjectLister + ?Sized> ProjectLister for &T {
    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        (**self).list_projects()
    }
}

impl<T: ProjectRepository + ?Sized> ProjectRepository for &T {
    fn create_project(&self, fields: &ProjectFields) -> RepoResult<Project> {
        (**self).create_project(fields)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        (**self).get_project(id)
    }

    fn update_project(&self, id: ProjectId, fields: &ProjectFields) -> RepoResult<Project> {
        (**self).update_project(id, fields)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        (**self).delete_project(id)
    }
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn require_project(&self, id: ProjectId) -> RepoResult<Project> {
        self.get_project(id)?.ok_or(RepoError::ProjectNotFound(id))
    }
}

impl ProjectLister for SqliteProjectRepository<'_> {
    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, fields: &ProjectFields) -> RepoResult<Project> {
        fields.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO projects (
                id,
                name,
                description,
                status,
                risk_level,
                due_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                fields.name.trim(),
                fields.description.as_deref(),
                fields.status.as_str(),
                fields.risk_level.as_str(),
                date_to_db(fields.due_date),
            ],
        )?;

        self.require_project(id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn update_project(&self, id: ProjectId, fields: &ProjectFields) -> RepoResult<Project> {
        fields.validate()?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE projects
                 SET
                    name = ?1,
                    description = ?2,
                    status = ?3,
                    risk_level = ?4,
                    due_date = ?5,
                    updated_at = MAX(updated_at, {NOW_MS_SQL})
                 WHERE id = ?6;"
            ),
            params![
                fields.name.trim(),
                fields.description.as_deref(),
                fields.status.as_str(),
                fields.risk_level.as_str(),
                date_to_db(fields.due_date),
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ProjectNotFound(id));
        }
        self.require_project(id)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ProjectNotFound(id));
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "projects.id")?;

    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text)
        .ok_or_else(|| invalid_enum(&status_text, "projects.status"))?;

    let risk_text: String = row.get("risk_level")?;
    let risk_level = RiskLevel::parse(&risk_text)
        .ok_or_else(|| invalid_enum(&risk_text, "projects.risk_level"))?;

    let project = Project {
        id,
        fields: ProjectFields {
            name: row.get("name")?,
            description: row.get("description")?,
            status,
            risk_level,
            due_date: parse_date(row.get("due_date")?, "projects.due_date")?,
        },
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    project.validate()?;
    Ok(project)
}
