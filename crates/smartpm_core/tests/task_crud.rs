use chrono::NaiveDate;
use smartpm_core::db::open_db_in_memory;
use smartpm_core::{
    Priority, ProjectFields, ProjectRepository, RepoError, RiskLevel, SqliteProjectRepository,
    SqliteTaskRepository, TaskCreator, TaskDraft, TaskFields, TaskListQuery, TaskRepository,
    TaskService, TaskStatus, TaskValidationError,
};
use uuid::Uuid;

fn task(name: &str, project_id: Option<Uuid>) -> TaskFields {
    TaskFields::from_draft(TaskDraft::new(name), project_id)
}

#[test]
fn create_applies_manual_defaults() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let created = repo.create_task(&task("Write docs", None)).unwrap();
    let loaded = repo.get_task(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.fields.project_id, None);
    assert_eq!(loaded.fields.status, TaskStatus::Todo);
    assert_eq!(loaded.fields.draft.priority, Priority::Medium);
    assert_eq!(loaded.fields.draft.risk_level, RiskLevel::Low);
    assert_eq!(loaded.fields.draft.estimated_hours, 0);
    assert!((loaded.fields.draft.confidence_score - 0.8).abs() < f64::EPSILON);
    assert!(loaded.fields.dependencies.is_empty());
    assert!(loaded.fields.tags.is_empty());
}

#[test]
fn optional_fields_roundtrip_and_tags_are_normalized() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);
    let repo = SqliteTaskRepository::new(&conn);
    let project = projects.create_project(&ProjectFields::new("p")).unwrap();

    let mut fields = task("Ship release", Some(project.id));
    fields.draft.description = Some("cut and tag".to_string());
    fields.draft.priority = Priority::High;
    fields.draft.risk_level = RiskLevel::Medium;
    fields.draft.estimated_hours = 6;
    fields.draft.confidence_score = 0.55;
    fields.assigned_to = Some("sam".to_string());
    fields.start_date = Some(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    fields.end_date = Some(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    fields.notes = Some("after QA".to_string());
    fields.tags = vec![
        " release ".to_string(),
        "Ops".to_string(),
        String::new(),
        "release".to_string(),
    ];

    let created = repo.create_task(&fields).unwrap();
    assert_eq!(created.fields.tags, vec!["Ops", "release"]);
    assert_eq!(created.fields.draft.description.as_deref(), Some("cut and tag"));
    assert_eq!(created.fields.assigned_to.as_deref(), Some("sam"));
    assert_eq!(created.fields.start_date, fields.start_date);
    assert_eq!(created.fields.end_date, fields.end_date);
    assert_eq!(created.fields.notes.as_deref(), Some("after QA"));
    assert_eq!(created.fields.draft.estimated_hours, 6);
    assert!((created.fields.draft.confidence_score - 0.55).abs() < 1e-9);
}

#[test]
fn dependencies_are_stored_without_existence_checks() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let dangling = Uuid::new_v4();

    let mut fields = task("Depends on ghost", None);
    fields.dependencies = vec![dangling, dangling];
    let created = repo.create_task(&fields).unwrap();

    assert_eq!(created.fields.dependencies, vec![dangling]);
}

#[test]
fn task_for_missing_project_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let err = repo
        .create_task(&task("Orphan", Some(Uuid::new_v4())))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.list_tasks(&TaskListQuery::default()).unwrap().is_empty());
}

#[test]
fn invalid_drafts_are_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let err = repo.create_task(&task("  ", None)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::TaskValidation(TaskValidationError::EmptyName)
    ));

    let mut fields = task("Overconfident", None);
    fields.draft.confidence_score = 1.2;
    let err = repo.create_task(&fields).unwrap_err();
    assert!(matches!(
        err,
        RepoError::TaskValidation(TaskValidationError::ConfidenceOutOfRange(_))
    ));
}

#[test]
fn list_filters_by_project_status_and_search() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::new(&conn);
    let repo = SqliteTaskRepository::new(&conn);
    let alpha = projects.create_project(&ProjectFields::new("alpha")).unwrap();
    let beta = projects.create_project(&ProjectFields::new("beta")).unwrap();

    let login = repo.create_task(&task("Build login form", Some(alpha.id))).unwrap();
    let mut blocked = task("Payment webhook", Some(alpha.id));
    blocked.status = TaskStatus::Blocked;
    blocked.assigned_to = Some("Lee".to_string());
    let blocked = repo.create_task(&blocked).unwrap();
    let other = repo.create_task(&task("Login audit", Some(beta.id))).unwrap();

    let alpha_tasks = repo
        .list_tasks(&TaskListQuery {
            project_id: Some(alpha.id),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(
        alpha_tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![blocked.id, login.id]
    );

    let blocked_only = repo
        .list_tasks(&TaskListQuery {
            status: Some(TaskStatus::Blocked),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(blocked_only.len(), 1);
    assert_eq!(blocked_only[0].id, blocked.id);

    let login_matches = repo
        .list_tasks(&TaskListQuery {
            search: Some("LOGIN".to_string()),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(
        login_matches.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![other.id, login.id]
    );

    let by_assignee = repo
        .list_tasks(&TaskListQuery {
            search: Some("lee".to_string()),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(by_assignee.len(), 1);
    assert_eq!(by_assignee[0].id, blocked.id);
}

#[test]
fn search_treats_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let literal = repo.create_task(&task("Reach 100% coverage", None)).unwrap();
    repo.create_task(&task("Reach 1000 users", None)).unwrap();

    let found = repo
        .list_tasks(&TaskListQuery {
            search: Some("100%".to_string()),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, literal.id);
}

#[test]
fn list_supports_limit_and_offset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let ids = (0..5)
        .map(|index| repo.create_task(&task(&format!("task {index}"), None)).unwrap().id)
        .collect::<Vec<_>>();

    let page = repo
        .list_tasks(&TaskListQuery {
            limit: Some(2),
            offset: 1,
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(
        page.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![ids[3], ids[2]]
    );
}

#[test]
fn service_status_change_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let service = TaskService::new(&repo);

    let created = service.create_task(&task("Triage", None)).unwrap();
    let moved = service
        .set_status(created.id, TaskStatus::InProgress)
        .unwrap();
    assert_eq!(moved.fields.status, TaskStatus::InProgress);
    assert_eq!(moved.created_at, created.created_at);

    service.delete_task(created.id).unwrap();
    assert_eq!(service.get_task(created.id).unwrap(), None);
    let err = service.delete_task(created.id).unwrap_err();
    assert!(matches!(err, RepoError::TaskNotFound(id) if id == created.id));
}
