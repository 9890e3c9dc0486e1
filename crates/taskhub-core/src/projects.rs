//! Project operations. All of them are admin-facing and owner-scoped: the
//! store query carries the owner id, so a project belonging to another admin
//! yields the same "not found or access denied" outcome as a missing one.

use chrono::{DateTime, Utc};
use taskhub_storage::{
    CreateProjectParams, Project, ProjectCode, ProjectId, ProjectUpdate, Store, StoreError, Task,
};
use tracing::info;

use crate::access::require_admin;
use crate::codes::{generate_code, CODE_INSERT_RETRIES, PROJECT_CODE_PREFIX};
use crate::error::{not_found_as, CoreError, CoreResult};
use crate::Principal;

const PROJECT_SCOPE_MSG: &str = "Project not found or access denied";

/// Input for creating a project.
#[derive(Clone, Debug)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
}

/// A project together with its tasks, as returned by [`get_project`].
#[derive(Clone, Debug)]
pub struct ProjectWithTasks {
    pub project: Project,
    pub tasks: Vec<Task>,
}

pub async fn create_project(
    store: &dyn Store,
    principal: &Principal,
    input: NewProject,
) -> CoreResult<Project> {
    require_admin(principal)?;
    if input.name.trim().is_empty() {
        return Err(CoreError::validation("Project name is required"));
    }

    // The probe-then-insert window can race; the UNIQUE index on the code
    // column rejects the loser, which we treat as a fresh collision.
    for _ in 0..CODE_INSERT_RETRIES {
        let code = generate_code(PROJECT_CODE_PREFIX, |code| async move {
            store.project_code_exists(&ProjectCode(code)).await
        })
        .await?;

        match store
            .create_project(&CreateProjectParams {
                name: input.name.clone(),
                description: input.description.clone(),
                code: ProjectCode(code),
                created_by: principal.id.clone(),
                deadline: input.deadline,
            })
            .await
        {
            Ok(project) => {
                info!(code = %project.code, "project created");
                return Ok(project);
            }
            Err(StoreError::AlreadyExists) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(CoreError::conflict(
        "Could not allocate a unique project code",
    ))
}

pub async fn list_projects(store: &dyn Store, principal: &Principal) -> CoreResult<Vec<Project>> {
    require_admin(principal)?;
    Ok(store.list_projects_for_owner(&principal.id).await?)
}

pub async fn get_project(
    store: &dyn Store,
    principal: &Principal,
    project_id: &ProjectId,
) -> CoreResult<ProjectWithTasks> {
    require_admin(principal)?;
    let project = store
        .get_project_for_owner(project_id, &principal.id)
        .await
        .map_err(not_found_as(PROJECT_SCOPE_MSG))?;
    let tasks = store.list_tasks_in_project(&project.id).await?;
    Ok(ProjectWithTasks { project, tasks })
}

pub async fn update_project(
    store: &dyn Store,
    principal: &Principal,
    project_id: &ProjectId,
    update: ProjectUpdate,
) -> CoreResult<Project> {
    require_admin(principal)?;
    let project = store
        .get_project_for_owner(project_id, &principal.id)
        .await
        .map_err(not_found_as(PROJECT_SCOPE_MSG))?;
    Ok(store.update_project(&project.id, &update).await?)
}

/// Delete a project and every task in it.
pub async fn delete_project(
    store: &dyn Store,
    principal: &Principal,
    project_id: &ProjectId,
) -> CoreResult<()> {
    require_admin(principal)?;
    let project = store
        .get_project_for_owner(project_id, &principal.id)
        .await
        .map_err(not_found_as(PROJECT_SCOPE_MSG))?;

    store.delete_tasks_in_project(&project.id).await?;
    store.delete_project(&project.id).await?;
    info!(code = %project.code, "project deleted with its tasks");
    Ok(())
}
