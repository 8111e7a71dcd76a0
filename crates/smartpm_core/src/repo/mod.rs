//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contracts the core relies on (list projects, create
//!   tasks, plus the CRUD surface used by services).
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Repository reads reject invalid persisted rows instead of masking them.
//! - Repository APIs return semantic errors (`*NotFound`) in addition to DB
//!   transport errors.

use crate::db::DbError;
use crate::model::project::{ProjectId, ProjectValidationError};
use crate::model::task::{TaskId, TaskValidationError};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod project_repo;
pub mod task_repo;

/// SQL expression for "now" in epoch milliseconds.
pub(crate) const NOW_MS_SQL: &str =
    "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project/task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    ProjectValidation(ProjectValidationError),
    TaskValidation(TaskValidationError),
    Db(DbError),
    ProjectNotFound(ProjectId),
    TaskNotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectValidation(err) => write!(f, "{err}"),
            Self::TaskValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ProjectValidation(err) => Some(err),
            Self::TaskValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::ProjectNotFound(_) | Self::TaskNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::ProjectValidation(value)
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::TaskValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_date(value: Option<String>, column: &str) -> RepoResult<Option<NaiveDate>> {
    value
        .map(|text| {
            NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!("invalid date value `{text}` in {column}"))
            })
        })
        .transpose()
}

pub(crate) fn date_to_db(value: Option<NaiveDate>) -> Option<String> {
    value.map(|date| date.format(DATE_FORMAT).to_string())
}

pub(crate) fn invalid_enum(value: &str, column: &str) -> RepoError {
    RepoError::InvalidData(format!("invalid value `{value}` in {column}"))
}
