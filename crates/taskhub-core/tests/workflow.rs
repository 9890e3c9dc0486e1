//! End-to-end workflow tests over the real SQLite in-memory store.

use taskhub_core::{access, chat, projects, requests, stats, tasks, users, CoreError, Principal};
use taskhub_storage::{
    CreateUserParams, MessageType, ProjectUpdate, RequestStatus, Role, Store, TaskStatus,
    TaskUpdate, User,
};
use taskhub_store_sqlite::SqliteStore;

async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.unwrap()
}

async fn seed_user(s: &SqliteStore, email: &str, role: Role) -> (User, Principal) {
    let user = s
        .create_user(&CreateUserParams {
            name: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            password_hash: "$argon2$opaque".to_string(),
            role,
            access_code: None,
        })
        .await
        .unwrap();
    let principal = Principal::new(user.id.clone(), role);
    (user, principal)
}

fn new_project(name: &str) -> projects::NewProject {
    projects::NewProject {
        name: name.to_string(),
        description: String::new(),
        deadline: None,
    }
}

fn new_task(project: &taskhub_storage::Project, title: &str) -> tasks::NewTask {
    tasks::NewTask {
        project_id: project.id.clone(),
        title: title.to_string(),
        description: String::new(),
        due_date: None,
        priority: None,
        assign_to_emails: vec![],
    }
}

#[tokio::test]
async fn shareable_code_round_trip() {
    // Full walk-through: create, request with sloppy input, approve,
    // re-request.
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (worker, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    assert!(project.code.as_str().starts_with("PROJ-"));

    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();
    assert!(task.code.as_str().starts_with("TASK-"));

    // Lowercase input with stray whitespace still resolves; the stored
    // request carries the canonical code.
    let sloppy = format!("  {} ", task.code.as_str().to_lowercase());
    let request = requests::request_access(&s, &worker_p, &sloppy, Some("I can help".into()))
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.task_code, task.code);
    assert_eq!(request.message, "I can help");

    let updated = requests::respond(&s, &admin, &request.id, "approved")
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Approved);
    assert_eq!(updated.responded_by, Some(admin.id.clone()));
    assert!(updated.responded_at.is_some());

    let task = s.get_task(&task.id).await.unwrap();
    assert!(task.is_assigned_to(&worker.id));

    // Requesting again now fails: the user is already assigned.
    let err = requests::request_access(&s, &worker_p, task.code.as_str(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn duplicate_pending_request_is_rejected() {
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (_, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();

    requests::request_access(&s, &worker_p, task.code.as_str(), None)
        .await
        .unwrap();
    let err = requests::request_access(&s, &worker_p, task.code.as_str(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn responding_is_single_use_and_nonmutating_after_that() {
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (worker, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();
    let request = requests::request_access(&s, &worker_p, task.code.as_str(), None)
        .await
        .unwrap();

    let rejected = requests::respond(&s, &admin, &request.id, "rejected")
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);

    // Any further decision fails without touching the record or the task.
    for decision in ["approved", "rejected"] {
        let err = requests::respond(&s, &admin, &request.id, decision)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }
    let reread = s.get_task_request(&request.id).await.unwrap();
    assert_eq!(reread.status, RequestStatus::Rejected);
    assert_eq!(reread.responded_at, rejected.responded_at);
    assert_eq!(reread.responded_by, rejected.responded_by);
    let task = s.get_task(&task.id).await.unwrap();
    assert!(!task.is_assigned_to(&worker.id));
}

#[tokio::test]
async fn approval_retry_leaves_requester_assigned_exactly_once() {
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (worker, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();
    let request = requests::request_access(&s, &worker_p, task.code.as_str(), None)
        .await
        .unwrap();

    requests::respond(&s, &admin, &request.id, "approved")
        .await
        .unwrap();
    // Operator retry: conflict, but the assignee set is unchanged.
    let err = requests::respond(&s, &admin, &request.id, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    let task = s.get_task(&task.id).await.unwrap();
    assert_eq!(
        task.assigned_to.iter().filter(|u| **u == worker.id).count(),
        1
    );
}

#[tokio::test]
async fn foreign_admin_cannot_respond() {
    let s = store().await;
    let (_, admin_a) = seed_user(&s, "a@example.com", Role::Admin).await;
    let (_, admin_b) = seed_user(&s, "b@example.com", Role::Admin).await;
    let (_, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin_a, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin_a, new_task(&project, "Build homepage"))
        .await
        .unwrap();
    let request = requests::request_access(&s, &worker_p, task.code.as_str(), None)
        .await
        .unwrap();

    let err = requests::respond(&s, &admin_b, &request.id, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    // Still pending for the real owner.
    let reread = s.get_task_request(&request.id).await.unwrap();
    assert_eq!(reread.status, RequestStatus::Pending);

    // A non-admin cannot respond at all.
    let err = requests::respond(&s, &worker_p, &request.id, "approved")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
async fn invalid_decision_is_a_validation_error() {
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (_, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();
    let request = requests::request_access(&s, &worker_p, task.code.as_str(), None)
        .await
        .unwrap();

    for bad in ["pending", "maybe", ""] {
        let err = requests::respond(&s, &admin, &request.id, bad)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)), "{bad:?}");
    }

    let err = requests::request_access(&s, &worker_p, "   ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn codes_are_unique_across_creations() {
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;

    let mut project_codes = std::collections::HashSet::new();
    let mut task_codes = std::collections::HashSet::new();
    for i in 0..20 {
        let project = projects::create_project(&s, &admin, new_project(&format!("P{i}")))
            .await
            .unwrap();
        assert!(project_codes.insert(project.code.clone()), "{}", project.code);
        let task = tasks::create_task(&s, &admin, new_task(&project, &format!("T{i}")))
            .await
            .unwrap();
        assert!(task_codes.insert(task.code.clone()), "{}", task.code);
    }
}

#[tokio::test]
async fn project_operations_fold_missing_and_unowned_together() {
    let s = store().await;
    let (_, admin_a) = seed_user(&s, "a@example.com", Role::Admin).await;
    let (_, admin_b) = seed_user(&s, "b@example.com", Role::Admin).await;

    let project = projects::create_project(&s, &admin_a, new_project("Website"))
        .await
        .unwrap();

    // B gets the combined outcome for A's project and for a random id alike.
    let err = projects::get_project(&s, &admin_b, &project.id)
        .await
        .unwrap_err();
    let CoreError::NotFound(msg) = err else {
        panic!("expected NotFound");
    };
    assert_eq!(msg, "Project not found or access denied");

    let err = projects::update_project(&s, &admin_b, &project.id, ProjectUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    let err = projects::delete_project(&s, &admin_b, &project.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn task_operations_keep_denied_distinct_from_missing() {
    let s = store().await;
    let (_, admin_a) = seed_user(&s, "a@example.com", Role::Admin).await;
    let (_, admin_b) = seed_user(&s, "b@example.com", Role::Admin).await;
    let (_, stranger) = seed_user(&s, "u@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin_a, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin_a, new_task(&project, "Build homepage"))
        .await
        .unwrap();

    // The task resolves, then access is denied: Forbidden, not NotFound.
    let err = tasks::get_task(&s, &admin_b, &task.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
    let err = tasks::get_task(&s, &stranger, &task.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    let err = tasks::get_task_by_code(&s, &stranger, task.code.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    let missing = taskhub_storage::TaskId(uuid::Uuid::now_v7());
    let err = tasks::get_task(&s, &admin_a, &missing).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn assigned_user_can_update_and_completion_is_stamped_once() {
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (worker, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();
    s.add_task_assignee(&task.id, &worker.id).await.unwrap();

    let updated = tasks::update_task(
        &s,
        &worker_p,
        &task.id,
        TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let stamp = updated.completed_at.expect("completed_at set");

    // Leaving and re-entering `completed` keeps the original stamp.
    tasks::update_task(
        &s,
        &worker_p,
        &task.id,
        TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let again = tasks::update_task(
        &s,
        &worker_p,
        &task.id,
        TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(again.completed_at, Some(stamp));
}

#[tokio::test]
async fn direct_assignment_by_email_at_creation() {
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (worker, _) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let mut input = new_task(&project, "Build homepage");
    input.assign_to_emails = vec![
        "worker@example.com".to_string(),
        "nobody@example.com".to_string(), // unknown addresses are skipped
    ];
    let task = tasks::create_task(&s, &admin, input).await.unwrap();

    assert_eq!(task.assigned_to, vec![worker.id.clone()]);
    let mine = tasks::my_tasks(&s, &Principal::new(worker.id, Role::User))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
}

#[tokio::test]
async fn request_listing_and_stats_are_ownership_scoped() {
    let s = store().await;
    let (_, admin_a) = seed_user(&s, "a@example.com", Role::Admin).await;
    let (_, admin_b) = seed_user(&s, "b@example.com", Role::Admin).await;
    let (_, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let pa = projects::create_project(&s, &admin_a, new_project("A site"))
        .await
        .unwrap();
    let ta = tasks::create_task(&s, &admin_a, new_task(&pa, "A task"))
        .await
        .unwrap();
    let tb = tasks::create_task(&s, &admin_a, new_task(&pa, "Another"))
        .await
        .unwrap();
    requests::request_access(&s, &worker_p, ta.code.as_str(), None)
        .await
        .unwrap();

    tasks::update_task(
        &s,
        &admin_a,
        &tb.id,
        TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // A sees its own pending request; B sees an empty world.
    let listed = requests::list_requests(&s, &admin_a).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(requests::list_requests(&s, &admin_b).await.unwrap().is_empty());

    let sa = stats::admin_stats(&s, &admin_a).await.unwrap();
    assert_eq!(
        sa,
        stats::AdminStats {
            total_projects: 1,
            total_tasks: 2,
            completed_tasks: 0,
            in_progress_tasks: 1,
            pending_requests: 1,
        }
    );
    let sb = stats::admin_stats(&s, &admin_b).await.unwrap();
    assert_eq!(sb, stats::AdminStats::default());

    // Stats are admin-gated.
    let err = stats::admin_stats(&s, &worker_p).await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
async fn respond_handles_dangling_task_link() {
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (_, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();
    let request = requests::request_access(&s, &worker_p, task.code.as_str(), None)
        .await
        .unwrap();

    tasks::delete_task(&s, &admin, &task.id).await.unwrap();

    let err = requests::respond(&s, &admin, &request.id, "approved")
        .await
        .unwrap_err();
    let CoreError::NotFound(msg) = err else {
        panic!("expected NotFound");
    };
    assert_eq!(msg, "Associated task not found");
}

#[tokio::test]
async fn profile_rules_and_user_stats() {
    let s = store().await;
    let (admin_u, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let (worker, worker_p) = seed_user(&s, "worker@example.com", Role::User).await;

    // A user cannot touch someone else's profile; an admin can.
    let err = users::update_profile(
        &s,
        &worker_p,
        &admin_u.id,
        taskhub_storage::UserUpdate {
            name: Some("Hacked".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    users::set_access_code(&s, &admin, &worker.id, Some("TEAM-A".into()))
        .await
        .unwrap();
    let found = users::find_users_by_access_code(&s, &admin, "TEAM-A")
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, worker.id);

    let stats = users::user_stats(&s, &admin).await.unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.admin_count, 1);
    assert_eq!(stats.with_access_code, 1);
    assert_eq!(stats.without_access_code, 1);

    let err = users::user_stats(&s, &worker_p).await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
async fn chat_appends_under_the_principal() {
    let s = store().await;
    let (admin_u, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();

    chat::post_message(&s, &admin, &task.id, "kickoff", None)
        .await
        .unwrap();
    chat::post_message(&s, &admin, &task.id, "deploy failed", Some(MessageType::Error))
        .await
        .unwrap();

    let err = chat::post_message(&s, &admin, &task.id, "   ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let log = chat::task_log(&s, &task.id).await.unwrap();
    assert_eq!(log.len(), 2);
    assert!(log.iter().all(|m| m.sender == admin_u.id));
    assert_eq!(log[0].message, "kickoff");
    assert_eq!(log[1].message_type, MessageType::Error);
}

#[tokio::test]
async fn capability_resolver_is_exported_for_transports() {
    // The resolver itself is public so a transport layer can pre-check.
    let s = store().await;
    let (_, admin) = seed_user(&s, "admin@example.com", Role::Admin).await;
    let project = projects::create_project(&s, &admin, new_project("Website"))
        .await
        .unwrap();
    let task = tasks::create_task(&s, &admin, new_task(&project, "Build homepage"))
        .await
        .unwrap();
    assert_eq!(
        access::task_capability(&admin, &task, &project),
        access::TaskCapability::OwnerAdmin
    );
}
