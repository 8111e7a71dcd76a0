//! SmartPM command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration (flags, then `SMARTPM_*` env vars, then defaults).
//! - Wire SQLite repositories into core services for one command.
//! - Render results as plain text; core owns every invariant.

mod cli;

use clap::Parser;
use cli::{Cli, Command, ProjectCommand, TaskCommand};
use smartpm_core::{
    decompose_with_domain, default_log_level, init_logging, open_db, AssistantService,
    ConversationError, Decomposition, LogNotifier, MaterializeResult, Notifier, NotifyKind,
    ProjectFields, ProjectService, SqliteProjectRepository, SqliteTaskRepository, Task, TaskDraft,
    TaskFields, TaskListQuery, TaskService,
};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

type CliResult = Result<ExitCode, Box<dyn Error>>;

/// Prints batch feedback to the terminal and mirrors it into the log.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Success => println!("{message}"),
            NotifyKind::Error => eprintln!("{message}"),
        }
        LogNotifier.notify(kind, message);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = setup_logging(cli.log_dir.as_deref(), cli.log_level.as_deref()) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("event=cli_command module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(log_dir: Option<&Path>, level: Option<&str>) -> Result<(), String> {
    let Some(log_dir) = log_dir else {
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| format!("cannot resolve working directory: {err}"))?
            .join(log_dir)
    };
    let level = level.unwrap_or_else(|| default_log_level().as_str());
    init_logging(level, &log_dir.to_string_lossy())
}

fn run(cli: Cli) -> CliResult {
    let conn = open_db(&cli.db)?;
    let projects = SqliteProjectRepository::new(&conn);
    let tasks = SqliteTaskRepository::new(&conn);

    match cli.command {
        Command::Project { command } => {
            let service = ProjectService::new(&projects, &tasks);
            match command {
                ProjectCommand::Add {
                    name,
                    description,
                    risk,
                    due,
                } => {
                    let mut fields = ProjectFields::new(name);
                    fields.description = description;
                    fields.risk_level = risk;
                    fields.due_date = due;
                    let project = service.create_project(&fields)?;
                    println!("{}", project.id);
                }
                ProjectCommand::List => {
                    for summary in service.list_summaries()? {
                        let project = &summary.project;
                        let due = project
                            .fields
                            .due_date
                            .map(|date| date.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "{}  {:<9}  risk={:<6}  due={:<10}  tasks={}  {}",
                            project.id,
                            project.fields.status.as_str(),
                            project.fields.risk_level.as_str(),
                            due,
                            summary.task_count,
                            project.name()
                        );
                    }
                }
                ProjectCommand::Status { id, status } => {
                    let project = service.set_status(id, status)?;
                    println!("{} -> {}", project.id, project.fields.status.as_str());
                }
                ProjectCommand::Delete { id } => {
                    service.delete_project(id)?;
                    println!("deleted {id}");
                }
            }
        }
        Command::Task { command } => {
            let service = TaskService::new(&tasks);
            match command {
                TaskCommand::Add {
                    name,
                    project,
                    description,
                    priority,
                    risk,
                    hours,
                    assignee,
                    tags,
                    dependencies,
                } => {
                    let mut draft = TaskDraft::new(name);
                    draft.description = description;
                    draft.priority = priority;
                    draft.risk_level = risk;
                    draft.estimated_hours = hours;
                    let mut fields = TaskFields::from_draft(draft, project);
                    fields.assigned_to = assignee;
                    fields.tags = tags;
                    fields.dependencies = dependencies;
                    let task = service.create_task(&fields)?;
                    println!("{}", task.id);
                }
                TaskCommand::List {
                    project,
                    status,
                    search,
                    limit,
                } => {
                    let query = TaskListQuery {
                        project_id: project,
                        status,
                        search,
                        limit,
                        offset: 0,
                    };
                    for task in service.list_tasks(&query)? {
                        print_task(&task);
                    }
                }
                TaskCommand::Status { id, status } => {
                    let task = service.set_status(id, status)?;
                    println!("{} -> {}", task.id, task.fields.status.as_str());
                }
                TaskCommand::Delete { id } => {
                    service.delete_task(id)?;
                    println!("deleted {id}");
                }
            }
        }
        Command::Decompose { description } => {
            let decomposition = preview_decomposition(&description)?;
            println!("domain: {}", decomposition.domain.as_str());
            for draft in &decomposition.drafts {
                print_draft(draft);
            }
        }
        Command::Assist {
            description,
            accept,
            project,
        } => {
            let assistant = AssistantService::new(&projects, &tasks, ConsoleNotifier);
            let exchange = assistant.submit(description)?;
            println!("{}", exchange.reply.text);
            for draft in exchange.reply.drafts.iter().flatten() {
                print_draft(draft);
            }
            if !accept {
                for suggestion in exchange.reply.suggestions.iter().flatten() {
                    println!("  > {suggestion}");
                }
                return Ok(ExitCode::SUCCESS);
            }
            return match assistant.accept(exchange.reply.id, project)? {
                MaterializeResult::Rejected(_) => Ok(ExitCode::FAILURE),
                MaterializeResult::Completed(report) => {
                    for task in &report.created {
                        print_task(task);
                    }
                    if report.failed == 0 {
                        Ok(ExitCode::SUCCESS)
                    } else {
                        for failure in &report.failures {
                            eprintln!("{failure}");
                        }
                        Ok(ExitCode::FAILURE)
                    }
                }
            };
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Decomposes without touching storage; blank text never reaches the engine.
fn preview_decomposition(description: &str) -> Result<Decomposition, ConversationError> {
    if description.trim().is_empty() {
        return Err(ConversationError::EmptyInput);
    }
    Ok(decompose_with_domain(description))
}

fn print_draft(draft: &TaskDraft) {
    println!(
        "- {:<40} priority={:<6} risk={:<6} hours={:>3} confidence={:.0}%",
        draft.task_name,
        draft.priority.as_str(),
        draft.risk_level.as_str(),
        draft.estimated_hours,
        draft.confidence_score * 100.0
    );
}

fn print_task(task: &Task) {
    println!(
        "{}  {:<11}  {:<6}  {}",
        task.id,
        task.fields.status.as_str(),
        task.fields.draft.priority.as_str(),
        task.name()
    );
}

#[cfg(test)]
mod tests {
    use super::{preview_decomposition, run, Cli};
    use clap::Parser;
    use smartpm_core::{ConversationError, Domain};

    #[test]
    fn blank_description_is_rejected_before_decomposing() {
        assert_eq!(
            preview_decomposition("").unwrap_err(),
            ConversationError::EmptyInput
        );
        assert_eq!(
            preview_decomposition(" \t\n").unwrap_err(),
            ConversationError::EmptyInput
        );
    }

    #[test]
    fn preview_keeps_engine_output() {
        let decomposition = preview_decomposition("login page").unwrap();
        assert_eq!(decomposition.domain, Domain::Authentication);
        assert_eq!(decomposition.drafts.len(), 5);
    }

    #[test]
    fn decompose_command_with_empty_text_fails() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("smartpm.sqlite3");
        let cli = Cli::try_parse_from([
            "smartpm",
            "--db",
            db.to_str().unwrap(),
            "decompose",
            "",
        ])
        .unwrap();

        let err = run(cli).unwrap_err();
        assert_eq!(err.to_string(), ConversationError::EmptyInput.to_string());
    }
}
