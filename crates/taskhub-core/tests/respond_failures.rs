//! Failure-path tests for responding to access requests, driven through a
//! mocked store so backend faults can be injected at exact points.

use chrono::Utc;
use taskhub_core::{requests, CoreError, Principal};
use taskhub_storage::{
    MockStore, Project, ProjectCode, ProjectId, ProjectStatus, RequestId, RequestStatus, Role,
    StoreError, Task, TaskCode, TaskId, TaskPriority, TaskRequest, TaskStatus, UserId,
};
use uuid::Uuid;

struct Fixture {
    admin: Principal,
    project: Project,
    task: Task,
    request: TaskRequest,
}

fn fixture() -> Fixture {
    let admin_id = UserId(Uuid::now_v7());
    let requester_id = UserId(Uuid::now_v7());
    let now = Utc::now();

    let project = Project {
        id: ProjectId(Uuid::now_v7()),
        name: "Website".to_string(),
        description: String::new(),
        code: ProjectCode("PROJ-1234".to_string()),
        created_by: admin_id.clone(),
        deadline: None,
        status: ProjectStatus::Active,
        created_at: now,
        updated_at: now,
    };
    let task = Task {
        id: TaskId(Uuid::now_v7()),
        project_id: project.id.clone(),
        title: "Build homepage".to_string(),
        description: String::new(),
        code: TaskCode("TASK-5678".to_string()),
        assigned_by: admin_id.clone(),
        assigned_to: vec![],
        due_date: None,
        priority: TaskPriority::Medium,
        status: TaskStatus::Pending,
        github_repo_link: String::new(),
        completed_at: None,
        created_at: now,
        updated_at: now,
    };
    let request = TaskRequest {
        id: RequestId(Uuid::now_v7()),
        task_code: task.code.clone(),
        task_id: task.id.clone(),
        requested_by: requester_id,
        status: RequestStatus::Pending,
        message: String::new(),
        responded_at: None,
        responded_by: None,
        created_at: now,
        updated_at: now,
    };
    Fixture {
        admin: Principal::new(admin_id, Role::Admin),
        project,
        task,
        request,
    }
}

#[tokio::test]
async fn response_write_failure_after_assignment_is_a_partial_failure() {
    let f = fixture();
    let mut store = MockStore::new();

    let request = f.request.clone();
    store
        .expect_get_task_request()
        .returning(move |_| Ok(request.clone()));
    let task = f.task.clone();
    store.expect_get_task().returning(move |_| Ok(task.clone()));
    let project = f.project.clone();
    store
        .expect_get_project()
        .returning(move |_| Ok(project.clone()));
    store
        .expect_add_task_assignee()
        .times(1)
        .returning(|_, _| Ok(()));
    store
        .expect_record_request_response()
        .times(1)
        .returning(|_, _| Err(StoreError::Backend("disk full".to_string())));

    let err = requests::respond(&store, &f.admin, &f.request.id, "approved")
        .await
        .unwrap_err();
    let CoreError::PartialFailure(msg) = err else {
        panic!("expected PartialFailure, got {err:?}");
    };
    assert!(msg.contains("Responding again is safe"), "{msg}");
}

#[tokio::test]
async fn rejection_never_touches_assignees() {
    let f = fixture();
    let mut store = MockStore::new();

    let request = f.request.clone();
    store
        .expect_get_task_request()
        .returning(move |_| Ok(request.clone()));
    let task = f.task.clone();
    store.expect_get_task().returning(move |_| Ok(task.clone()));
    let project = f.project.clone();
    store
        .expect_get_project()
        .returning(move |_| Ok(project.clone()));
    store.expect_add_task_assignee().times(0);
    let mut responded = f.request.clone();
    responded.status = RequestStatus::Rejected;
    store
        .expect_record_request_response()
        .times(1)
        .returning(move |_, _| Ok(responded.clone()));

    let updated = requests::respond(&store, &f.admin, &f.request.id, "rejected")
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Rejected);
}

#[tokio::test]
async fn losing_the_guarded_transition_is_a_plain_conflict() {
    // Another responder flips the request between our read and our write.
    let f = fixture();
    let mut store = MockStore::new();

    let request = f.request.clone();
    store
        .expect_get_task_request()
        .returning(move |_| Ok(request.clone()));
    let task = f.task.clone();
    store.expect_get_task().returning(move |_| Ok(task.clone()));
    let project = f.project.clone();
    store
        .expect_get_project()
        .returning(move |_| Ok(project.clone()));
    store.expect_add_task_assignee().returning(|_, _| Ok(()));
    store
        .expect_record_request_response()
        .returning(|_, _| Err(StoreError::Conflict));

    let err = requests::respond(&store, &f.admin, &f.request.id, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn assignment_failure_leaves_the_request_untouched() {
    let f = fixture();
    let mut store = MockStore::new();

    let request = f.request.clone();
    store
        .expect_get_task_request()
        .returning(move |_| Ok(request.clone()));
    let task = f.task.clone();
    store.expect_get_task().returning(move |_| Ok(task.clone()));
    let project = f.project.clone();
    store
        .expect_get_project()
        .returning(move |_| Ok(project.clone()));
    store
        .expect_add_task_assignee()
        .returning(|_, _| Err(StoreError::Backend("disk full".to_string())));
    // Assignment failed, so the response write is never attempted.
    store.expect_record_request_response().times(0);

    let err = requests::respond(&store, &f.admin, &f.request.id, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Store(_)));
}

#[tokio::test]
async fn missing_request_is_not_found() {
    let f = fixture();
    let mut store = MockStore::new();
    store
        .expect_get_task_request()
        .returning(|_| Err(StoreError::NotFound));

    let err = requests::respond(&store, &f.admin, &f.request.id, "approved")
        .await
        .unwrap_err();
    let CoreError::NotFound(msg) = err else {
        panic!("expected NotFound, got {err:?}");
    };
    assert_eq!(msg, "Request not found");
}
