//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait `taskhub-core` depends on.
///
/// Scoping conventions mirror the authorization model: project lookups that
/// take an owner id fold "absent" and "not owned" into a single `NotFound`
/// (the query itself is owner-scoped, so the two are indistinguishable), while
/// task lookups resolve by id/code regardless of owner and leave the access
/// decision to the caller.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Users ──────────────────────────────────────────

    /// Create a new user. `AlreadyExists` if the email is taken.
    async fn create_user(&self, params: &CreateUserParams) -> Result<User, StoreError>;

    /// Get user by ID.
    async fn get_user(&self, user_id: &UserId) -> Result<User, StoreError>;

    /// Get user by email.
    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// List all users.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Find users whose email is in the given set (membership filter).
    async fn find_users_by_emails(&self, emails: &[String]) -> Result<Vec<User>, StoreError>;

    /// Find users carrying the given access-code label.
    async fn find_users_by_access_code(&self, access_code: &str) -> Result<Vec<User>, StoreError>;

    /// Apply a partial profile update and return the updated record.
    async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> Result<User, StoreError>;

    /// Replace the stored password hash (opaque to this layer).
    async fn set_user_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    /// Delete a user. No cascade: references from tasks/requests may dangle.
    async fn delete_user(&self, user_id: &UserId) -> Result<(), StoreError>;

    /// Aggregate user counts for the admin dashboard.
    async fn user_counts(&self) -> Result<UserCounts, StoreError>;

    // ───────────────────────────────────── Projects ───────────────────────────────────────

    /// Create a project. `AlreadyExists` if the code collides.
    async fn create_project(&self, params: &CreateProjectParams) -> Result<Project, StoreError>;

    /// Get a project by ID, unscoped. Used to resolve ownership chains.
    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, StoreError>;

    /// Get a project by ID, scoped to its owner. An unowned project is
    /// indistinguishable from a nonexistent one by design.
    async fn get_project_for_owner(
        &self,
        project_id: &ProjectId,
        owner: &UserId,
    ) -> Result<Project, StoreError>;

    /// List all projects owned by the given admin, newest first.
    async fn list_projects_for_owner(&self, owner: &UserId) -> Result<Vec<Project>, StoreError>;

    /// Whether any project carries this code.
    async fn project_code_exists(&self, code: &ProjectCode) -> Result<bool, StoreError>;

    /// Apply a partial update and return the updated record.
    async fn update_project(
        &self,
        project_id: &ProjectId,
        update: &ProjectUpdate,
    ) -> Result<Project, StoreError>;

    /// Delete a project row (tasks are cascaded by the caller).
    async fn delete_project(&self, project_id: &ProjectId) -> Result<(), StoreError>;

    // ───────────────────────────────────── Tasks ──────────────────────────────────────────

    /// Create a task. `AlreadyExists` if the code collides.
    async fn create_task(&self, params: &CreateTaskParams) -> Result<Task, StoreError>;

    /// Get a task by ID.
    async fn get_task(&self, task_id: &TaskId) -> Result<Task, StoreError>;

    /// Get a task by its unique (canonical, uppercase) code.
    async fn get_task_by_code(&self, code: &TaskCode) -> Result<Task, StoreError>;

    /// List tasks in one project, newest first.
    async fn list_tasks_in_project(&self, project_id: &ProjectId) -> Result<Vec<Task>, StoreError>;

    /// List tasks across a set of projects, newest first (membership filter).
    async fn list_tasks_in_projects(
        &self,
        project_ids: &[ProjectId],
    ) -> Result<Vec<Task>, StoreError>;

    /// List tasks the given user is assigned to, newest first.
    async fn list_tasks_assigned_to(&self, user_id: &UserId) -> Result<Vec<Task>, StoreError>;

    /// Whether any task carries this code.
    async fn task_code_exists(&self, code: &TaskCode) -> Result<bool, StoreError>;

    /// Apply a partial update and return the updated record.
    async fn update_task(&self, task_id: &TaskId, update: &TaskUpdate)
        -> Result<Task, StoreError>;

    /// Add a user to the task's assignee set. Idempotent union: adding an
    /// already-present user is a no-op, which is what makes approval retries
    /// safe.
    async fn add_task_assignee(&self, task_id: &TaskId, user_id: &UserId)
        -> Result<(), StoreError>;

    /// Delete a task.
    async fn delete_task(&self, task_id: &TaskId) -> Result<(), StoreError>;

    /// Delete every task in a project (project-deletion cascade).
    async fn delete_tasks_in_project(&self, project_id: &ProjectId) -> Result<(), StoreError>;

    // ───────────────────────────────────── Task requests ──────────────────────────────────

    /// Create an access request (status starts at `pending`).
    async fn create_task_request(
        &self,
        params: &CreateTaskRequestParams,
    ) -> Result<TaskRequest, StoreError>;

    /// Get a request by ID.
    async fn get_task_request(&self, request_id: &RequestId) -> Result<TaskRequest, StoreError>;

    /// The duplicate guard: the pending request for (task, requester), if any.
    async fn find_pending_request(
        &self,
        task_id: &TaskId,
        requested_by: &UserId,
    ) -> Result<Option<TaskRequest>, StoreError>;

    /// List requests targeting any of the given tasks, newest first
    /// (membership filter; the last stage of the ownership walk).
    async fn list_requests_for_tasks(
        &self,
        task_ids: &[TaskId],
    ) -> Result<Vec<TaskRequest>, StoreError>;

    /// Record a response on a still-pending request and return the updated
    /// record. `Conflict` if the request is no longer pending (the write is
    /// guarded, so concurrent responders cannot both win); `NotFound` if the
    /// request does not exist.
    async fn record_request_response(
        &self,
        request_id: &RequestId,
        response: &RequestResponse,
    ) -> Result<TaskRequest, StoreError>;

    // ───────────────────────────────────── Chat ───────────────────────────────────────────

    /// Append a chat message to a task's log.
    async fn create_chat_message(
        &self,
        params: &CreateChatMessageParams,
    ) -> Result<ChatMessage, StoreError>;

    /// List a task's chat messages, oldest first.
    async fn list_chat_messages(&self, task_id: &TaskId) -> Result<Vec<ChatMessage>, StoreError>;
}
