//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `tasks` table, including the `create_task` entry
//!   point used once per materialized draft.
//! - Own list filtering (project, status, name/assignee search) and
//!   per-project counting.
//!
//! # Invariants
//! - Write paths call `TaskFields::validate()` and normalize tags before SQL
//!   mutations.
//! - A task can only reference an existing project (FK enforced by SQLite).
//! - `dependencies` are stored verbatim; no existence or cycle checks.
//! - Lists are ordered newest first (`created_at DESC, rowid DESC`).

use crate::model::level::{Priority, RiskLevel};
use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskDraft, TaskFields, TaskId, TaskStatus};
use crate::repo::{
    date_to_db, invalid_enum, parse_date, parse_uuid, RepoError, RepoResult, NOW_MS_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    task_name,
    description,
    status,
    priority,
    risk_level,
    confidence_score,
    estimated_hours,
    assigned_to,
    start_date,
    end_date,
    dependencies,
    tags,
    notes,
    created_at,
    updated_at
FROM tasks";

/// Query options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    /// Restrict to one project. `None` lists every task, assigned or not.
    pub project_id: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    /// Case-insensitive substring match against task name or assignee.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Write contract the task materializer calls once per accepted draft.
pub trait TaskCreator {
    /// Inserts a new task and returns the stored record.
    fn create_task(&self, fields: &TaskFields) -> RepoResult<Task>;
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository: TaskCreator {
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Replaces all writable fields of one task.
    fn update_task(&self, id: TaskId, fields: &TaskFields) -> RepoResult<Task>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Counts tasks assigned to one project.
    fn count_tasks(&self, project_id: ProjectId) -> RepoResult<u64>;
}

impl<T: TaskCreator + ?Sized> TaskCreator for &T {
    fn create_task(&self, fields: &TaskFields) -> RepoResult<Task> {
        (**self).create_task(fields)
    }
}

impl<T: TaskRepository + ?Sized> TaskRepository for &T {
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        (**self).get_task(id)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        (**self).list_tasks(query)
    }

    fn update_task(&self, id: TaskId, fields: &TaskFields) -> RepoResult<Task> {
        (**self).update_task(id, fields)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        (**self).delete_task(id)
    }

    fn count_tasks(&self, project_id: ProjectId) -> RepoResult<u64> {
        (**self).count_tasks(project_id)
    }
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn require_task(&self, id: TaskId) -> RepoResult<Task> {
        self.get_task(id)?.ok_or(RepoError::TaskNotFound(id))
    }
}

impl TaskCreator for SqliteTaskRepository<'_> {
    fn create_task(&self, fields: &TaskFields) -> RepoResult<Task> {
        fields.validate()?;
        let fields = fields.clone().normalized();
        let id = Uuid::new_v4();
        let draft = &fields.draft;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                project_id,
                task_name,
                description,
                status,
                priority,
                risk_level,
                confidence_score,
                estimated_hours,
                assigned_to,
                start_date,
                end_date,
                dependencies,
                tags,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                id.to_string(),
                fields.project_id.map(|project_id| project_id.to_string()),
                draft.task_name.trim(),
                draft.description.as_deref(),
                fields.status.as_str(),
                draft.priority.as_str(),
                draft.risk_level.as_str(),
                draft.confidence_score,
                draft.estimated_hours,
                fields.assigned_to.as_deref(),
                date_to_db(fields.start_date),
                date_to_db(fields.end_date),
                ids_to_json(&fields.dependencies)?,
                strings_to_json(&fields.tags)?,
                fields.notes.as_deref(),
            ],
        )?;

        self.require_task(id)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(project_id) = query.project_id {
            sql.push_str(" AND project_id = ?");
            bind_values.push(Value::Text(project_id.to_string()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            sql.push_str(
                " AND (task_name LIKE ? ESCAPE '\\' OR IFNULL(assigned_to, '') LIKE ? ESCAPE '\\')",
            );
            let pattern = like_pattern(search);
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn update_task(&self, id: TaskId, fields: &TaskFields) -> RepoResult<Task> {
        fields.validate()?;
        let fields = fields.clone().normalized();
        let draft = &fields.draft;

        let changed = self.conn.execute(
            &format!(
                "UPDATE tasks
                 SET
                    project_id = ?1,
                    task_name = ?2,
                    description = ?3,
                    status = ?4,
                    priority = ?5,
                    risk_level = ?6,
                    confidence_score = ?7,
                    estimated_hours = ?8,
                    assigned_to = ?9,
                    start_date = ?10,
                    end_date = ?11,
                    dependencies = ?12,
                    tags = ?13,
                    notes = ?14,
                    updated_at = MAX(updated_at, {NOW_MS_SQL})
                 WHERE id = ?15;"
            ),
            params![
                fields.project_id.map(|project_id| project_id.to_string()),
                draft.task_name.trim(),
                draft.description.as_deref(),
                fields.status.as_str(),
                draft.priority.as_str(),
                draft.risk_level.as_str(),
                draft.confidence_score,
                draft.estimated_hours,
                fields.assigned_to.as_deref(),
                date_to_db(fields.start_date),
                date_to_db(fields.end_date),
                ids_to_json(&fields.dependencies)?,
                strings_to_json(&fields.tags)?,
                fields.notes.as_deref(),
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::TaskNotFound(id));
        }
        self.require_task(id)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(id));
        }
        Ok(())
    }

    fn count_tasks(&self, project_id: ProjectId) -> RepoResult<u64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE project_id = ?1;",
            [project_id.to_string()],
            |row| row.get::<_, i64>(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative task count `{count}`")))
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "tasks.id")?;

    let project_id = match row.get::<_, Option<String>>("project_id")? {
        Some(value) => Some(parse_uuid(&value, "tasks.project_id")?),
        None => None,
    };

    let status_text: String = row.get("status")?;
    let status =
        TaskStatus::parse(&status_text).ok_or_else(|| invalid_enum(&status_text, "tasks.status"))?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text)
        .ok_or_else(|| invalid_enum(&priority_text, "tasks.priority"))?;

    let risk_text: String = row.get("risk_level")?;
    let risk_level =
        RiskLevel::parse(&risk_text).ok_or_else(|| invalid_enum(&risk_text, "tasks.risk_level"))?;

    let dependencies_text: String = row.get("dependencies")?;
    let dependencies = serde_json::from_str::<Vec<String>>(&dependencies_text)
        .map_err(|err| {
            RepoError::InvalidData(format!("invalid json in tasks.dependencies: {err}"))
        })?
        .iter()
        .map(|value| parse_uuid(value, "tasks.dependencies"))
        .collect::<RepoResult<Vec<_>>>()?;

    let tags_text: String = row.get("tags")?;
    let tags = serde_json::from_str::<Vec<String>>(&tags_text)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in tasks.tags: {err}")))?;

    let task = Task {
        id,
        fields: TaskFields {
            project_id,
            draft: TaskDraft {
                task_name: row.get("task_name")?,
                description: row.get("description")?,
                priority,
                risk_level,
                estimated_hours: row.get("estimated_hours")?,
                confidence_score: row.get("confidence_score")?,
            },
            status,
            assigned_to: row.get("assigned_to")?,
            start_date: parse_date(row.get("start_date")?, "tasks.start_date")?,
            end_date: parse_date(row.get("end_date")?, "tasks.end_date")?,
            dependencies,
            tags,
            notes: row.get("notes")?,
        },
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn ids_to_json(ids: &[TaskId]) -> RepoResult<String> {
    let values = ids.iter().map(Uuid::to_string).collect::<Vec<_>>();
    strings_to_json(&values)
}

fn strings_to_json(values: &[String]) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode json array: {err}")))
}

fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
        assert_eq!(like_pattern("login"), "%login%");
    }
}
