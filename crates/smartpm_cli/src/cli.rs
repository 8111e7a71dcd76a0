//! CLI command definitions and subcommands.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use smartpm_core::{Priority, ProjectStatus, RiskLevel, TaskStatus};
use std::path::PathBuf;
use uuid::Uuid;

/// SmartPM - project tracker with a task decomposition assistant
#[derive(Debug, Parser)]
#[command(name = "smartpm", version, about = "Project and task tracker with AI-style task breakdown")]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "SMARTPM_DB_PATH", default_value = "smartpm.sqlite3")]
    pub db: PathBuf,

    /// Directory for rolling log files; logging stays off when unset
    #[arg(long, global = true, env = "SMARTPM_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, global = true, env = "SMARTPM_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Preview the task breakdown of a feature description without saving
    Decompose {
        /// Free-text feature description
        description: String,
    },

    /// Ask the assistant for a breakdown and optionally add it to a project
    Assist {
        /// Free-text feature description
        description: String,

        /// Create the generated tasks
        #[arg(short, long)]
        accept: bool,

        /// Target project; defaults to the first project
        #[arg(short, long, value_parser = parse_uuid)]
        project: Option<Uuid>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Create a project
    Add {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, value_parser = parse_risk, default_value = "low")]
        risk: RiskLevel,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },

    /// List projects with task counts
    List,

    /// Change a project's status (active, completed, on-hold)
    Status {
        #[arg(value_parser = parse_uuid)]
        id: Uuid,

        #[arg(value_parser = parse_project_status)]
        status: ProjectStatus,
    },

    /// Delete a project and all of its tasks
    Delete {
        #[arg(value_parser = parse_uuid)]
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Create a task manually
    Add {
        name: String,

        #[arg(short, long, value_parser = parse_uuid)]
        project: Option<Uuid>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,

        #[arg(long, value_parser = parse_risk, default_value = "low")]
        risk: RiskLevel,

        #[arg(long, default_value_t = 0)]
        hours: u32,

        #[arg(long)]
        assignee: Option<String>,

        /// Repeatable tag
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Repeatable dependency task id
        #[arg(long = "depends-on", value_parser = parse_uuid)]
        dependencies: Vec<Uuid>,
    },

    /// List tasks, newest first
    List {
        #[arg(short, long, value_parser = parse_uuid)]
        project: Option<Uuid>,

        #[arg(short, long, value_parser = parse_task_status)]
        status: Option<TaskStatus>,

        /// Substring of task name or assignee
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Change a task's status (todo, in-progress, completed, blocked)
    Status {
        #[arg(value_parser = parse_uuid)]
        id: Uuid,

        #[arg(value_parser = parse_task_status)]
        status: TaskStatus,
    },

    /// Delete a task
    Delete {
        #[arg(value_parser = parse_uuid)]
        id: Uuid,
    },
}

fn parse_uuid(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value).map_err(|err| format!("invalid id `{value}`: {err}"))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("invalid date `{value}` (expected YYYY-MM-DD): {err}"))
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("unknown priority `{value}`"))
}

fn parse_risk(value: &str) -> Result<RiskLevel, String> {
    RiskLevel::parse(value).ok_or_else(|| format!("unknown risk level `{value}`"))
}

fn parse_project_status(value: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(value).ok_or_else(|| format!("unknown project status `{value}`"))
}

fn parse_task_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value).ok_or_else(|| format!("unknown task status `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assist_parses_accept_and_project() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "smartpm",
            "assist",
            "login page",
            "--accept",
            "--project",
            &id.to_string(),
        ])
        .expect("valid args");
        match cli.command {
            Command::Assist {
                description,
                accept,
                project,
            } => {
                assert_eq!(description, "login page");
                assert!(accept);
                assert_eq!(project, Some(id));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_task_status() {
        let result = Cli::try_parse_from(["smartpm", "task", "list", "--status", "done"]);
        assert!(result.is_err());
    }
}
