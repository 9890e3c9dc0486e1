//! Ownership resolver: the single place access rights are derived from the
//! ownership chain (project `created_by` → task `project_id` → request
//! `task_id`).
//!
//! The resolver operates on fully-resolved records, never on raw foreign keys;
//! callers look the entities up first and then ask for the capability. Project
//! operations don't appear here because they are scoped by owner in the store
//! query itself, where an unowned project is indistinguishable from a
//! nonexistent one. That is the intended "not found or access denied" outcome.

use taskhub_storage::{Project, Task};

use crate::error::{CoreError, CoreResult};
use crate::Principal;

/// Access level a principal holds over a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskCapability {
    /// Admin who owns the task's project: full control.
    OwnerAdmin,
    /// Regular user present in the task's assignee set.
    Assigned,
    /// No capability; operations must fail with access denied.
    Denied,
}

/// Whether the principal is the owning admin of a project.
pub fn owns_project(principal: &Principal, project: &Project) -> bool {
    principal.is_admin() && project.created_by == principal.id
}

/// Resolve the principal's capability over a task. The project must be the
/// task's own project; ownership is always derived from it, never from the
/// task record.
pub fn task_capability(principal: &Principal, task: &Task, project: &Project) -> TaskCapability {
    if principal.is_admin() {
        if owns_project(principal, project) {
            TaskCapability::OwnerAdmin
        } else {
            TaskCapability::Denied
        }
    } else if task.is_assigned_to(&principal.id) {
        TaskCapability::Assigned
    } else {
        TaskCapability::Denied
    }
}

/// Gate for admin-only operations.
pub(crate) fn require_admin(principal: &Principal) -> CoreResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(CoreError::forbidden("Admin access required"))
    }
}
