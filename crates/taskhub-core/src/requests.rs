//! The task-access request workflow.
//!
//! State machine: `pending -> approved` or `pending -> rejected`, both
//! terminal. Approval mutates two aggregates (the request row and the task's
//! assignee set) without a spanning transaction, so the order of writes and
//! the idempotent assignee union are what keep retries safe: the assignment is
//! applied first, and a request can therefore never end up `approved` without
//! the requester in the assignee set. If the second write fails the caller
//! gets [`CoreError::PartialFailure`] and simply responds again.

use chrono::Utc;
use taskhub_storage::{
    CreateTaskRequestParams, RequestDecision, RequestId, RequestStatus, Store, StoreError,
    TaskCode, TaskRequest,
};
use tracing::{info, warn};

use crate::access::{owns_project, require_admin};
use crate::error::{not_found_as, CoreError, CoreResult};
use crate::Principal;

/// A user requests access to a task by its shareable code.
///
/// The code is normalized (trimmed, uppercased) before lookup, and the stored
/// request denormalizes the canonical code from the task rather than echoing
/// caller input.
pub async fn request_access(
    store: &dyn Store,
    principal: &Principal,
    task_code: &str,
    message: Option<String>,
) -> CoreResult<TaskRequest> {
    let code = TaskCode::parse(task_code);
    if code.as_str().is_empty() {
        return Err(CoreError::validation("Task code is required"));
    }

    let task = store
        .get_task_by_code(&code)
        .await
        .map_err(not_found_as("Task not found with this code"))?;

    if task.is_assigned_to(&principal.id) {
        return Err(CoreError::conflict("You are already assigned to this task"));
    }

    if store
        .find_pending_request(&task.id, &principal.id)
        .await?
        .is_some()
    {
        return Err(CoreError::conflict(
            "You already have a pending request for this task",
        ));
    }

    let request = store
        .create_task_request(&CreateTaskRequestParams {
            task_code: task.code.clone(),
            task_id: task.id.clone(),
            requested_by: principal.id.clone(),
            message: message.unwrap_or_default(),
        })
        .await?;
    info!(code = %request.task_code, "access requested");
    Ok(request)
}

/// The owning admin approves or rejects a pending request.
///
/// `decision` must be `"approved"` or `"rejected"`; anything else is a
/// validation error. Responding is single-use: a request that has left
/// `pending` can never be responded to again.
pub async fn respond(
    store: &dyn Store,
    principal: &Principal,
    request_id: &RequestId,
    decision: &str,
) -> CoreResult<TaskRequest> {
    require_admin(principal)?;
    let decision: RequestDecision = decision
        .parse()
        .map_err(|_| CoreError::validation("Status must be approved or rejected"))?;

    let request = store
        .get_task_request(request_id)
        .await
        .map_err(not_found_as("Request not found"))?;

    if request.status != RequestStatus::Pending {
        return Err(CoreError::conflict(
            "This request has already been processed",
        ));
    }

    // The request may outlive its task; a dangling link is a handled outcome.
    let task = store
        .get_task(&request.task_id)
        .await
        .map_err(not_found_as("Associated task not found"))?;
    let project = store
        .get_project(&task.project_id)
        .await
        .map_err(not_found_as("Project not found"))?;

    if !owns_project(principal, &project) {
        return Err(CoreError::forbidden(
            "Access denied. You do not own this project.",
        ));
    }

    // Assignment goes first: if it fails nothing has been written and the
    // request is still pending; if the response write below fails instead,
    // the request stays pending with the assignment already in place, and a
    // retry re-runs the union as a no-op.
    if decision == RequestDecision::Approved {
        store
            .add_task_assignee(&task.id, &request.requested_by)
            .await?;
    }

    let response = taskhub_storage::RequestResponse {
        status: decision.as_status(),
        responded_at: Utc::now(),
        responded_by: principal.id.clone(),
    };
    match store.record_request_response(&request.id, &response).await {
        Ok(updated) => {
            info!(code = %updated.task_code, status = updated.status.as_str(), "request responded");
            Ok(updated)
        }
        // A concurrent responder won the guarded transition; the union we may
        // have applied is idempotent, so this is a plain conflict.
        Err(StoreError::Conflict) => Err(CoreError::conflict(
            "This request has already been processed",
        )),
        Err(e) if decision == RequestDecision::Approved => {
            warn!(code = %request.task_code, error = %e, "assignment applied but response write failed");
            Err(CoreError::partial_failure(format!(
                "User was assigned but the request could not be marked approved: {e}. \
                 Responding again is safe.",
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// All requests targeting tasks the calling admin transitively owns.
///
/// Ownership is two hops away, so this is a three-stage filter: the admin's
/// project ids, then task ids within those projects, then requests referencing
/// those tasks.
pub async fn list_requests(
    store: &dyn Store,
    principal: &Principal,
) -> CoreResult<Vec<TaskRequest>> {
    require_admin(principal)?;
    let projects = store.list_projects_for_owner(&principal.id).await?;
    let project_ids: Vec<_> = projects.into_iter().map(|p| p.id).collect();
    let tasks = store.list_tasks_in_projects(&project_ids).await?;
    let task_ids: Vec<_> = tasks.into_iter().map(|t| t.id).collect();
    Ok(store.list_requests_for_tasks(&task_ids).await?)
}
