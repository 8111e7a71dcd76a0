use smartpm_core::{
    decompose, MaterializeRejection, MaterializeResult, Notifier, NotifyKind, Project,
    ProjectFields, ProjectLister, RepoError, RepoResult, Task, TaskCreator, TaskDraft, TaskFields,
    TaskMaterializer, TaskStatus,
};
use std::cell::{Cell, RefCell};
use uuid::Uuid;

struct FakeProjects {
    projects: Vec<Project>,
    unavailable: bool,
}

impl FakeProjects {
    fn with(names: &[&str]) -> Self {
        let projects = names
            .iter()
            .map(|name| Project {
                id: Uuid::new_v4(),
                fields: ProjectFields::new(*name),
                created_at: 0,
                updated_at: 0,
            })
            .collect();
        Self {
            projects,
            unavailable: false,
        }
    }
}

impl ProjectLister for FakeProjects {
    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        if self.unavailable {
            return Err(RepoError::InvalidData("store offline".to_string()));
        }
        Ok(self.projects.clone())
    }
}

#[derive(Default)]
struct FakeTasks {
    fail_on_call: Option<usize>,
    calls: Cell<usize>,
    received: RefCell<Vec<TaskFields>>,
}

impl TaskCreator for FakeTasks {
    fn create_task(&self, fields: &TaskFields) -> RepoResult<Task> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        self.received.borrow_mut().push(fields.clone());
        if self.fail_on_call == Some(call) {
            return Err(RepoError::InvalidData("write rejected".to_string()));
        }
        Ok(Task {
            id: Uuid::new_v4(),
            fields: fields.clone(),
            created_at: 0,
            updated_at: 0,
        })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: RefCell<Vec<(NotifyKind, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        self.messages.borrow_mut().push((kind, message.to_string()));
    }
}

#[test]
fn no_projects_rejects_without_creating_anything() {
    let projects = FakeProjects::with(&[]);
    let tasks = FakeTasks::default();
    let notifier = RecordingNotifier::default();
    let materializer = TaskMaterializer::new(&projects, &tasks, &notifier);

    let result = materializer.materialize(&decompose("login"), None).unwrap();

    assert_eq!(
        result,
        MaterializeResult::Rejected(MaterializeRejection::NoProjectAvailable)
    );
    assert_eq!(tasks.calls.get(), 0);
    assert_eq!(
        *notifier.messages.borrow(),
        vec![(
            NotifyKind::Error,
            "No project available. Create a project before adding generated tasks.".to_string()
        )]
    );
}

#[test]
fn unknown_target_is_rejected_before_any_creation() {
    let projects = FakeProjects::with(&["only"]);
    let tasks = FakeTasks::default();
    let notifier = RecordingNotifier::default();
    let materializer = TaskMaterializer::new(&projects, &tasks, &notifier);
    let missing = Uuid::new_v4();

    let result = materializer
        .materialize(&decompose("login"), Some(missing))
        .unwrap();

    assert_eq!(
        result,
        MaterializeResult::Rejected(MaterializeRejection::ProjectNotFound(missing))
    );
    assert_eq!(tasks.calls.get(), 0);
    assert_eq!(notifier.messages.borrow().len(), 1);
}

#[test]
fn drafts_land_in_first_project_in_order_as_todo() {
    let projects = FakeProjects::with(&["first", "second"]);
    let tasks = FakeTasks::default();
    let notifier = RecordingNotifier::default();
    let materializer = TaskMaterializer::new(&projects, &tasks, &notifier);
    let drafts = decompose("shop");

    let result = materializer.materialize(&drafts, None).unwrap();

    let MaterializeResult::Completed(report) = result else {
        panic!("expected a completed batch");
    };
    assert_eq!(report.project_id, projects.projects[0].id);
    assert_eq!((report.attempted, report.succeeded, report.failed), (4, 4, 0));

    let received = tasks.received.borrow();
    for (fields, draft) in received.iter().zip(&drafts) {
        assert_eq!(&fields.draft, draft);
        assert_eq!(fields.project_id, Some(projects.projects[0].id));
        assert_eq!(fields.status, TaskStatus::Todo);
        assert_eq!(fields.assigned_to, None);
        assert!(fields.dependencies.is_empty());
    }
    assert_eq!(
        *notifier.messages.borrow(),
        vec![(NotifyKind::Success, "Created 4 tasks successfully".to_string())]
    );
}

#[test]
fn explicit_target_overrides_first_project() {
    let projects = FakeProjects::with(&["first", "second"]);
    let tasks = FakeTasks::default();
    let notifier = RecordingNotifier::default();
    let materializer = TaskMaterializer::new(&projects, &tasks, &notifier);
    let target = projects.projects[1].id;

    let result = materializer
        .materialize(&[TaskDraft::new("one-off")], Some(target))
        .unwrap();

    let MaterializeResult::Completed(report) = result else {
        panic!("expected a completed batch");
    };
    assert_eq!(report.project_id, target);
    assert_eq!(tasks.received.borrow()[0].project_id, Some(target));
}

#[test]
fn one_failed_creation_does_not_stop_the_batch() {
    let projects = FakeProjects::with(&["p"]);
    let tasks = FakeTasks {
        fail_on_call: Some(1),
        ..FakeTasks::default()
    };
    let notifier = RecordingNotifier::default();
    let materializer = TaskMaterializer::new(&projects, &tasks, &notifier);
    let drafts = decompose("widget framework");

    let result = materializer.materialize(&drafts, None).unwrap();

    let MaterializeResult::Completed(report) = result else {
        panic!("expected a completed batch");
    };
    assert_eq!(tasks.calls.get(), 4);
    assert_eq!((report.attempted, report.succeeded, report.failed), (4, 3, 1));
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(
        report
            .created
            .iter()
            .map(|task| task.name().to_string())
            .collect::<Vec<_>>(),
        vec![
            "Research widget framework",
            "Implement widget framework",
            "Test widget framework",
        ]
    );
    assert_eq!(
        *notifier.messages.borrow(),
        vec![(NotifyKind::Error, "Created 3 of 4 tasks; 1 failed".to_string())]
    );
}

#[test]
fn listing_failure_is_reported_and_propagated() {
    let projects = FakeProjects {
        projects: Vec::new(),
        unavailable: true,
    };
    let tasks = FakeTasks::default();
    let notifier = RecordingNotifier::default();
    let materializer = TaskMaterializer::new(&projects, &tasks, &notifier);

    let err = materializer
        .materialize(&decompose("app"), None)
        .unwrap_err();

    assert!(matches!(err, RepoError::InvalidData(_)));
    assert_eq!(tasks.calls.get(), 0);
    assert_eq!(notifier.messages.borrow().len(), 1);
    assert_eq!(notifier.messages.borrow()[0].0, NotifyKind::Error);
}
