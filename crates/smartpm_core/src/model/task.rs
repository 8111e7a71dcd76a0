//! Task domain model.
//!
//! # Responsibility
//! - Define the draft shape shared by generated and persisted tasks.
//! - Define the create/update payload and the persisted task record.
//!
//! # Invariants
//! - `task_name` is non-empty after trimming.
//! - `0.0 <= confidence_score <= 1.0`.
//! - `estimated_hours` is a non-negative whole number of hours, for manual and
//!   generated tasks alike; fractional estimates such as 2.5 are not stored.
//! - `dependencies` are never checked for existence or cycles.
//! - `updated_at >= created_at` on persisted tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use super::level::{Priority, RiskLevel};
use super::project::ProjectId;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Confidence assigned to manually created tasks.
pub const DEFAULT_CONFIDENCE_SCORE: f64 = 0.8;

/// Task workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Created but not started.
    Todo,
    InProgress,
    Completed,
    /// Waiting on something outside the task.
    Blocked,
}

impl TaskStatus {
    /// Stable string used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    /// Parses the stable string form. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

/// Estimation-bearing subset of a task.
///
/// This is the value produced by the decomposition engine. A draft that has
/// been accepted lives on inside `TaskFields`, and gains an identity only when
/// wrapped by a persisted [`Task`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub task_name: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub risk_level: RiskLevel,
    /// Whole hours.
    pub estimated_hours: u32,
    /// In `[0.0, 1.0]`.
    pub confidence_score: f64,
}

impl TaskDraft {
    /// Creates a draft with manual-entry defaults.
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            description: None,
            priority: Priority::default(),
            risk_level: RiskLevel::default(),
            estimated_hours: 0,
            confidence_score: DEFAULT_CONFIDENCE_SCORE,
        }
    }

    /// Validates name and confidence invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.task_name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        // NaN fails both comparisons and is rejected here as well.
        if !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(TaskValidationError::ConfidenceOutOfRange(
                self.confidence_score,
            ));
        }
        Ok(())
    }
}

/// Task fields minus identity and timestamps.
///
/// Used both as the create payload and as the full-replacement update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFields {
    /// `None` means the task is not assigned to any project.
    pub project_id: Option<ProjectId>,
    #[serde(flatten)]
    pub draft: TaskDraft,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Accepted as-is; no existence or cycle checks.
    pub dependencies: Vec<TaskId>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

impl TaskFields {
    /// Wraps a draft into a `todo` task payload with every optional field unset.
    pub fn from_draft(draft: TaskDraft, project_id: Option<ProjectId>) -> Self {
        Self {
            project_id,
            draft,
            status: TaskStatus::Todo,
            assigned_to: None,
            start_date: None,
            end_date: None,
            dependencies: Vec::new(),
            tags: Vec::new(),
            notes: None,
        }
    }

    /// Validates the embedded draft.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        self.draft.validate()
    }

    /// Returns a copy with tags trimmed, deduplicated and blank-free, and with
    /// duplicate dependency ids removed (first occurrence wins).
    pub fn normalized(mut self) -> Self {
        self.tags = normalize_tags(&self.tags);
        let mut seen = BTreeSet::new();
        self.dependencies.retain(|id| seen.insert(*id));
        self
    }
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(flatten)]
    pub fields: TaskFields,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never earlier than `created_at`.
    pub updated_at: i64,
}

impl Task {
    /// Validates field and timestamp invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        self.fields.validate()?;
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::TimestampOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.fields.draft.task_name.as_str()
    }
}

/// Trims, drops blanks and deduplicates tags, returning them sorted.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Task invariant violations.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskValidationError {
    EmptyName,
    ConfidenceOutOfRange(f64),
    TimestampOrder { created_at: i64, updated_at: i64 },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name must not be empty"),
            Self::ConfidenceOutOfRange(value) => {
                write!(f, "confidence score {value} is outside [0, 1]")
            }
            Self::TimestampOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "task updated_at {updated_at} is earlier than created_at {created_at}"
            ),
        }
    }
}

impl Error for TaskValidationError {}
