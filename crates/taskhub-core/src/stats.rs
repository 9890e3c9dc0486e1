//! Derived read-only counts for the admin dashboard. Recomputed on demand;
//! nothing here is cached or streamed.

use taskhub_storage::{RequestStatus, Store, TaskStatus};

use crate::access::require_admin;
use crate::error::CoreResult;
use crate::Principal;

/// Counts over the entities the calling admin transitively owns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub pending_requests: usize,
}

/// Walk the same ownership chain as the workflow: owned projects, tasks in
/// them, requests targeting those tasks. An admin never sees counts for
/// entities outside that chain.
pub async fn admin_stats(store: &dyn Store, principal: &Principal) -> CoreResult<AdminStats> {
    require_admin(principal)?;

    let projects = store.list_projects_for_owner(&principal.id).await?;
    let project_ids: Vec<_> = projects.iter().map(|p| p.id.clone()).collect();

    let tasks = store.list_tasks_in_projects(&project_ids).await?;
    let task_ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();

    let requests = store.list_requests_for_tasks(&task_ids).await?;

    Ok(AdminStats {
        total_projects: projects.len(),
        total_tasks: tasks.len(),
        completed_tasks: tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count(),
        in_progress_tasks: tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count(),
        pending_requests: requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count(),
    })
}
