//! Task operations. Tasks are resolved by id/code first and access-checked
//! second, so "missing" and "not yours" stay distinct outcomes (unlike
//! project operations, which fold them together in the query).

use chrono::{DateTime, Utc};
use taskhub_storage::{
    CreateTaskParams, ProjectId, Store, StoreError, Task, TaskCode, TaskId, TaskPriority,
    TaskStatus, TaskUpdate,
};
use tracing::info;

use crate::access::{require_admin, task_capability, TaskCapability};
use crate::codes::{generate_code, CODE_INSERT_RETRIES, TASK_CODE_PREFIX};
use crate::error::{not_found_as, CoreError, CoreResult};
use crate::Principal;

/// Input for creating a task.
#[derive(Clone, Debug)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    /// Users to assign directly at creation, looked up by email. Unknown
    /// addresses are skipped, not errors.
    pub assign_to_emails: Vec<String>,
}

/// Create a task in a project owned by the calling admin, optionally assigning
/// users by email.
pub async fn create_task(
    store: &dyn Store,
    principal: &Principal,
    input: NewTask,
) -> CoreResult<Task> {
    require_admin(principal)?;
    if input.title.trim().is_empty() {
        return Err(CoreError::validation("Task title is required"));
    }
    let project = store
        .get_project_for_owner(&input.project_id, &principal.id)
        .await
        .map_err(not_found_as("Project not found or access denied"))?;

    let mut task = None;
    for _ in 0..CODE_INSERT_RETRIES {
        let code = generate_code(TASK_CODE_PREFIX, |code| async move {
            store.task_code_exists(&TaskCode(code)).await
        })
        .await?;

        match store
            .create_task(&CreateTaskParams {
                project_id: project.id.clone(),
                title: input.title.clone(),
                description: input.description.clone(),
                code: TaskCode(code),
                assigned_by: principal.id.clone(),
                due_date: input.due_date,
                priority: input.priority.unwrap_or(TaskPriority::Medium),
            })
            .await
        {
            Ok(created) => {
                task = Some(created);
                break;
            }
            Err(StoreError::AlreadyExists) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    let task = task.ok_or_else(|| CoreError::conflict("Could not allocate a unique task code"))?;

    if !input.assign_to_emails.is_empty() {
        let users = store.find_users_by_emails(&input.assign_to_emails).await?;
        for user in &users {
            store.add_task_assignee(&task.id, &user.id).await?;
        }
        if !users.is_empty() {
            info!(code = %task.code, assigned = users.len(), "task created with direct assignment");
            return Ok(store.get_task(&task.id).await?);
        }
    }
    info!(code = %task.code, "task created");
    Ok(task)
}

/// All tasks across every project the calling admin owns (two-stage filter:
/// owned project ids, then tasks within them).
pub async fn list_all_tasks(store: &dyn Store, principal: &Principal) -> CoreResult<Vec<Task>> {
    require_admin(principal)?;
    let projects = store.list_projects_for_owner(&principal.id).await?;
    let project_ids: Vec<_> = projects.into_iter().map(|p| p.id).collect();
    Ok(store.list_tasks_in_projects(&project_ids).await?)
}

/// Tasks in one project, owner-scoped.
pub async fn list_project_tasks(
    store: &dyn Store,
    principal: &Principal,
    project_id: &ProjectId,
) -> CoreResult<Vec<Task>> {
    require_admin(principal)?;
    let project = store
        .get_project_for_owner(project_id, &principal.id)
        .await
        .map_err(not_found_as("Project not found or access denied"))?;
    Ok(store.list_tasks_in_project(&project.id).await?)
}

/// Tasks the calling principal is assigned to.
pub async fn my_tasks(store: &dyn Store, principal: &Principal) -> CoreResult<Vec<Task>> {
    Ok(store.list_tasks_assigned_to(&principal.id).await?)
}

/// Resolve a task and check the principal's capability over it.
async fn resolve_with_capability(
    store: &dyn Store,
    principal: &Principal,
    task: Task,
) -> CoreResult<(Task, TaskCapability)> {
    let project = store
        .get_project(&task.project_id)
        .await
        .map_err(not_found_as("Project not found"))?;
    match task_capability(principal, &task, &project) {
        TaskCapability::Denied if principal.is_admin() => {
            Err(CoreError::forbidden("Access denied"))
        }
        TaskCapability::Denied => Err(CoreError::forbidden("You are not assigned to this task")),
        capability => Ok((task, capability)),
    }
}

pub async fn get_task(
    store: &dyn Store,
    principal: &Principal,
    task_id: &TaskId,
) -> CoreResult<Task> {
    let task = store
        .get_task(task_id)
        .await
        .map_err(not_found_as("Task not found"))?;
    let (task, _) = resolve_with_capability(store, principal, task).await?;
    Ok(task)
}

/// Look up a task by its shareable code (input is normalized before lookup).
pub async fn get_task_by_code(
    store: &dyn Store,
    principal: &Principal,
    code: &str,
) -> CoreResult<Task> {
    let code = TaskCode::parse(code);
    if code.as_str().is_empty() {
        return Err(CoreError::validation("Task code is required"));
    }
    let task = store
        .get_task_by_code(&code)
        .await
        .map_err(not_found_as("Task not found"))?;
    let (task, _) = resolve_with_capability(store, principal, task).await?;
    Ok(task)
}

pub async fn update_task(
    store: &dyn Store,
    principal: &Principal,
    task_id: &TaskId,
    mut update: TaskUpdate,
) -> CoreResult<Task> {
    let task = store
        .get_task(task_id)
        .await
        .map_err(not_found_as("Task not found"))?;
    let (task, _) = resolve_with_capability(store, principal, task).await?;

    // completed_at is stamped exactly once, on the first transition into
    // `completed`; callers cannot set or clear it directly.
    update.completed_at = match (update.status, task.completed_at) {
        (Some(TaskStatus::Completed), None) => Some(Utc::now()),
        _ => None,
    };

    Ok(store.update_task(&task.id, &update).await?)
}

/// Delete a task. Owner-admin only.
pub async fn delete_task(
    store: &dyn Store,
    principal: &Principal,
    task_id: &TaskId,
) -> CoreResult<()> {
    require_admin(principal)?;
    let task = store
        .get_task(task_id)
        .await
        .map_err(not_found_as("Task not found"))?;
    let (task, capability) = resolve_with_capability(store, principal, task).await?;
    debug_assert_eq!(capability, TaskCapability::OwnerAdmin);

    store.delete_task(&task.id).await?;
    info!(code = %task.code, "task deleted");
    Ok(())
}
