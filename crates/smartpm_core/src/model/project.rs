//! Project domain model.
//!
//! # Responsibility
//! - Define the container record that tasks are grouped under.
//! - Validate field invariants before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another project.
//! - `name` is non-empty after trimming.
//! - `updated_at >= created_at`.
//! - Deleting a project deletes every task referencing it (storage cascade).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use super::level::RiskLevel;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

impl ProjectStatus {
    /// Stable string used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }

    /// Parses the stable string form. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "on-hold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Writable project fields (everything except identity and timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFields {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub risk_level: RiskLevel,
    pub due_date: Option<NaiveDate>,
}

impl ProjectFields {
    /// Creates an active, low-risk project with no description or due date.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            status: ProjectStatus::default(),
            risk_level: RiskLevel::default(),
            due_date: None,
        }
    }

    /// Validates field-level invariants.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Persisted project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(flatten)]
    pub fields: ProjectFields,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never earlier than `created_at`.
    pub updated_at: i64,
}

impl Project {
    /// Validates field and timestamp invariants.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        self.fields.validate()?;
        if self.updated_at < self.created_at {
            return Err(ProjectValidationError::TimestampOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.fields.name.as_str()
    }
}

/// Project invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyName,
    TimestampOrder { created_at: i64, updated_at: i64 },
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "project name must not be empty"),
            Self::TimestampOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "project updated_at {updated_at} is earlier than created_at {created_at}"
            ),
        }
    }
}

impl Error for ProjectValidationError {}
