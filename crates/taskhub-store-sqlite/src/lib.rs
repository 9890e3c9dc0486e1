//! SQLite backend for the taskhub [`Store`] trait.
//!
//! Row ids are UUIDv7 strings; timestamps are stored as unix seconds.
//! Uniqueness (user email, project/task codes) is enforced by UNIQUE indexes,
//! and a violation surfaces as [`StoreError::AlreadyExists`] so callers can
//! treat a code collision at insert time as retryable.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use taskhub_storage::{
    ChatMessage, ChatMessageId, CreateChatMessageParams, CreateProjectParams, CreateTaskParams,
    CreateTaskRequestParams, CreateUserParams, Project, ProjectCode, ProjectId, ProjectUpdate,
    RequestId, RequestResponse, Store, StoreError, Task, TaskCode, TaskId,
    TaskRequest, TaskUpdate, User, UserCounts, UserId, UserUpdate,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.taskhub/store.db` (creates dir with 0700 perms on unix).
    /// `TASKHUB_DB_PATH` overrides the location.
    pub async fn open_default() -> Result<Self, StoreError> {
        let path = match std::env::var("TASKHUB_DB_PATH") {
            Ok(p) => std::path::PathBuf::from(p),
            Err(_) => {
                let dir = dirs::home_dir()
                    .ok_or_else(|| StoreError::Backend("no home dir".into()))?
                    .join(".taskhub");
                std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                        .map_err(|e| StoreError::Backend(e.to_string()))?;
                }
                dir.join("store.db")
            }
        };
        let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self::open(&url).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

// ───────────────────────────── Row plumbing ─────────────────────────────

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn insert_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

fn ts(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Backend(format!("timestamp out of range: {secs}")))
}

fn opt_ts(secs: Option<i64>) -> Result<Option<DateTime<Utc>>, StoreError> {
    secs.map(ts).transpose()
}

fn parse_enum<T>(s: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: Display,
{
    s.parse::<T>().map_err(|e| StoreError::Backend(e.to_string()))
}

const USER_COLS: &str = "id,name,email,password_hash,role,access_code,created_at,updated_at";
type UserRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    i64,
    i64,
);

fn user_from_row(row: UserRow) -> Result<User, StoreError> {
    let (id, name, email, password_hash, role, access_code, created_at, updated_at) = row;
    Ok(User {
        id: UserId(parse_uuid(&id)?),
        name,
        email,
        password_hash,
        role: parse_enum(&role)?,
        access_code,
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

const PROJECT_COLS: &str =
    "id,name,description,code,created_by,deadline,status,created_at,updated_at";
type ProjectRow = (
    String,
    String,
    String,
    String,
    String,
    Option<i64>,
    String,
    i64,
    i64,
);

fn project_from_row(row: ProjectRow) -> Result<Project, StoreError> {
    let (id, name, description, code, created_by, deadline, status, created_at, updated_at) = row;
    Ok(Project {
        id: ProjectId(parse_uuid(&id)?),
        name,
        description,
        code: ProjectCode(code),
        created_by: UserId(parse_uuid(&created_by)?),
        deadline: opt_ts(deadline)?,
        status: parse_enum(&status)?,
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

const TASK_COLS: &str = "id,project_id,title,description,code,assigned_by,due_date,priority,\
                         status,github_repo_link,completed_at,created_at,updated_at";
const TASK_COLS_T: &str = "t.id,t.project_id,t.title,t.description,t.code,t.assigned_by,\
                           t.due_date,t.priority,t.status,t.github_repo_link,t.completed_at,\
                           t.created_at,t.updated_at";
type TaskRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<i64>,
    String,
    String,
    String,
    Option<i64>,
    i64,
    i64,
);

fn task_from_row(row: TaskRow, assigned_to: Vec<UserId>) -> Result<Task, StoreError> {
    let (
        id,
        project_id,
        title,
        description,
        code,
        assigned_by,
        due_date,
        priority,
        status,
        github_repo_link,
        completed_at,
        created_at,
        updated_at,
    ) = row;
    Ok(Task {
        id: TaskId(parse_uuid(&id)?),
        project_id: ProjectId(parse_uuid(&project_id)?),
        title,
        description,
        code: TaskCode(code),
        assigned_by: UserId(parse_uuid(&assigned_by)?),
        assigned_to,
        due_date: opt_ts(due_date)?,
        priority: parse_enum(&priority)?,
        status: parse_enum(&status)?,
        github_repo_link,
        completed_at: opt_ts(completed_at)?,
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

const REQUEST_COLS: &str = "id,task_code,task_id,requested_by,status,message,responded_at,\
                            responded_by,created_at,updated_at";
type RequestRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<i64>,
    Option<String>,
    i64,
    i64,
);

fn request_from_row(row: RequestRow) -> Result<TaskRequest, StoreError> {
    let (
        id,
        task_code,
        task_id,
        requested_by,
        status,
        message,
        responded_at,
        responded_by,
        created_at,
        updated_at,
    ) = row;
    Ok(TaskRequest {
        id: RequestId(parse_uuid(&id)?),
        task_code: TaskCode(task_code),
        task_id: TaskId(parse_uuid(&task_id)?),
        requested_by: UserId(parse_uuid(&requested_by)?),
        status: parse_enum(&status)?,
        message,
        responded_at: opt_ts(responded_at)?,
        responded_by: responded_by
            .as_deref()
            .map(parse_uuid)
            .transpose()?
            .map(UserId),
        created_at: ts(created_at)?,
        updated_at: ts(updated_at)?,
    })
}

const CHAT_COLS: &str = "id,task_id,sender,message,message_type,created_at";
type ChatRow = (String, String, String, String, String, i64);

fn chat_from_row(row: ChatRow) -> Result<ChatMessage, StoreError> {
    let (id, task_id, sender, message, message_type, created_at) = row;
    Ok(ChatMessage {
        id: ChatMessageId(parse_uuid(&id)?),
        task_id: TaskId(parse_uuid(&task_id)?),
        sender: UserId(parse_uuid(&sender)?),
        message,
        message_type: parse_enum(&message_type)?,
        created_at: ts(created_at)?,
    })
}

/// `?,?,...` placeholder list for IN clauses.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

impl SqliteStore {
    async fn load_assignees(&self, task_id: &str) -> Result<Vec<UserId>, StoreError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT user_id FROM task_assignees WHERE task_id=? ORDER BY created_at, user_id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter()
            .map(|(id,)| Ok(UserId(parse_uuid(&id)?)))
            .collect()
    }

    async fn assemble_tasks(&self, rows: Vec<TaskRow>) -> Result<Vec<Task>, StoreError> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let assigned_to = self.load_assignees(&row.0).await?;
            out.push(task_from_row(row, assigned_to)?);
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────── Users ─────────────────────────────

    async fn create_user(&self, params: &CreateUserParams) -> Result<User, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO users(id,name,email,password_hash,role,access_code,created_at,updated_at)
             VALUES(?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.name)
        .bind(&params.email)
        .bind(&params.password_hash)
        .bind(params.role.as_str())
        .bind(&params.access_code)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;
        self.get_user(&UserId(id)).await
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users WHERE id=?"
        ))
        .bind(user_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => user_from_row(row),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users WHERE email=?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => user_from_row(row),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter().map(user_from_row).collect()
    }

    async fn find_users_by_emails(&self, emails: &[String]) -> Result<Vec<User>, StoreError> {
        if emails.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT {USER_COLS} FROM users WHERE email IN ({})",
            placeholders(emails.len())
        );
        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        for email in emails {
            query = query.bind(email);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(backend)?;
        rows.into_iter().map(user_from_row).collect()
    }

    async fn find_users_by_access_code(&self, access_code: &str) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users WHERE access_code=? ORDER BY created_at DESC, id DESC"
        ))
        .bind(access_code)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter().map(user_from_row).collect()
    }

    async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> Result<User, StoreError> {
        let current = self.get_user(user_id).await?;
        let name = update.name.clone().unwrap_or(current.name);
        let email = update.email.clone().unwrap_or(current.email);
        let access_code = match &update.access_code {
            Some(value) => value.clone(),
            None => current.access_code,
        };
        sqlx::query("UPDATE users SET name=?, email=?, access_code=?, updated_at=? WHERE id=?")
            .bind(&name)
            .bind(&email)
            .bind(&access_code)
            .bind(Utc::now().timestamp())
            .bind(user_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(insert_err)?;
        self.get_user(user_id).await
    }

    async fn set_user_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash=?, updated_at=? WHERE id=?")
            .bind(password_hash)
            .bind(Utc::now().timestamp())
            .bind(user_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id=?")
            .bind(user_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn user_counts(&self) -> Result<UserCounts, StoreError> {
        let (total, admins, with_access_code) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN role='admin' THEN 1 ELSE 0 END),0),
                    COALESCE(SUM(CASE WHEN access_code IS NOT NULL THEN 1 ELSE 0 END),0)
             FROM users",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(UserCounts {
            total: total as u64,
            admins: admins as u64,
            users: (total - admins) as u64,
            with_access_code: with_access_code as u64,
        })
    }

    // ───────────────────────────── Projects ─────────────────────────────

    async fn create_project(&self, params: &CreateProjectParams) -> Result<Project, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO projects(id,name,description,code,created_by,deadline,status,created_at,updated_at)
             VALUES(?,?,?,?,?,?,'active',?,?)",
        )
        .bind(id.to_string())
        .bind(&params.name)
        .bind(&params.description)
        .bind(params.code.as_str())
        .bind(params.created_by.0.to_string())
        .bind(params.deadline.map(|d| d.timestamp()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;
        self.get_project(&ProjectId(id)).await
    }

    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLS} FROM projects WHERE id=?"
        ))
        .bind(project_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => project_from_row(row),
        }
    }

    async fn get_project_for_owner(
        &self,
        project_id: &ProjectId,
        owner: &UserId,
    ) -> Result<Project, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLS} FROM projects WHERE id=? AND created_by=?"
        ))
        .bind(project_id.0.to_string())
        .bind(owner.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => project_from_row(row),
        }
    }

    async fn list_projects_for_owner(&self, owner: &UserId) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLS} FROM projects WHERE created_by=?
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter().map(project_from_row).collect()
    }

    async fn project_code_exists(&self, code: &ProjectCode) -> Result<bool, StoreError> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM projects WHERE code=?")
            .bind(code.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.0 > 0)
    }

    async fn update_project(
        &self,
        project_id: &ProjectId,
        update: &ProjectUpdate,
    ) -> Result<Project, StoreError> {
        let current = self.get_project(project_id).await?;
        let name = update.name.clone().unwrap_or(current.name);
        let description = update.description.clone().unwrap_or(current.description);
        let status = update.status.unwrap_or(current.status);
        let deadline = update.deadline.or(current.deadline);
        sqlx::query(
            "UPDATE projects SET name=?, description=?, status=?, deadline=?, updated_at=?
             WHERE id=?",
        )
        .bind(&name)
        .bind(&description)
        .bind(status.as_str())
        .bind(deadline.map(|d| d.timestamp()))
        .bind(Utc::now().timestamp())
        .bind(project_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        self.get_project(project_id).await
    }

    async fn delete_project(&self, project_id: &ProjectId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id=?")
            .bind(project_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ───────────────────────────── Tasks ─────────────────────────────

    async fn create_task(&self, params: &CreateTaskParams) -> Result<Task, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO tasks(id,project_id,title,description,code,assigned_by,due_date,priority,
                               status,github_repo_link,completed_at,created_at,updated_at)
             VALUES(?,?,?,?,?,?,?,?,'pending','',NULL,?,?)",
        )
        .bind(id.to_string())
        .bind(params.project_id.0.to_string())
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.code.as_str())
        .bind(params.assigned_by.0.to_string())
        .bind(params.due_date.map(|d| d.timestamp()))
        .bind(params.priority.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;
        self.get_task(&TaskId(id)).await
    }

    async fn get_task(&self, task_id: &TaskId) -> Result<Task, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLS} FROM tasks WHERE id=?"
        ))
        .bind(task_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => {
                let assigned_to = self.load_assignees(&row.0).await?;
                task_from_row(row, assigned_to)
            }
        }
    }

    async fn get_task_by_code(&self, code: &TaskCode) -> Result<Task, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLS} FROM tasks WHERE code=?"
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => {
                let assigned_to = self.load_assignees(&row.0).await?;
                task_from_row(row, assigned_to)
            }
        }
    }

    async fn list_tasks_in_project(&self, project_id: &ProjectId) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLS} FROM tasks WHERE project_id=?
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(project_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        self.assemble_tasks(rows).await
    }

    async fn list_tasks_in_projects(
        &self,
        project_ids: &[ProjectId],
    ) -> Result<Vec<Task>, StoreError> {
        if project_ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT {TASK_COLS} FROM tasks WHERE project_id IN ({})
             ORDER BY created_at DESC, id DESC",
            placeholders(project_ids.len())
        );
        let mut query = sqlx::query_as::<_, TaskRow>(&sql);
        for project_id in project_ids {
            query = query.bind(project_id.0.to_string());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(backend)?;
        self.assemble_tasks(rows).await
    }

    async fn list_tasks_assigned_to(&self, user_id: &UserId) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLS_T} FROM tasks t
             JOIN task_assignees a ON a.task_id=t.id
             WHERE a.user_id=?
             ORDER BY t.created_at DESC, t.id DESC"
        ))
        .bind(user_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        self.assemble_tasks(rows).await
    }

    async fn task_code_exists(&self, code: &TaskCode) -> Result<bool, StoreError> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM tasks WHERE code=?")
            .bind(code.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.0 > 0)
    }

    async fn update_task(
        &self,
        task_id: &TaskId,
        update: &TaskUpdate,
    ) -> Result<Task, StoreError> {
        let current = self.get_task(task_id).await?;
        let title = update.title.clone().unwrap_or(current.title);
        let description = update.description.clone().unwrap_or(current.description);
        let status = update.status.unwrap_or(current.status);
        let github_repo_link = update
            .github_repo_link
            .clone()
            .unwrap_or(current.github_repo_link);
        let priority = update.priority.unwrap_or(current.priority);
        let due_date = update.due_date.or(current.due_date);
        let completed_at = update.completed_at.or(current.completed_at);
        sqlx::query(
            "UPDATE tasks SET title=?, description=?, status=?, github_repo_link=?, priority=?,
                              due_date=?, completed_at=?, updated_at=?
             WHERE id=?",
        )
        .bind(&title)
        .bind(&description)
        .bind(status.as_str())
        .bind(&github_repo_link)
        .bind(priority.as_str())
        .bind(due_date.map(|d| d.timestamp()))
        .bind(completed_at.map(|d| d.timestamp()))
        .bind(Utc::now().timestamp())
        .bind(task_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        self.get_task(task_id).await
    }

    async fn add_task_assignee(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
    ) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT OR IGNORE INTO task_assignees(task_id,user_id,created_at) VALUES(?,?,?)",
        )
        .bind(task_id.0.to_string())
        .bind(user_id.0.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if result.rows_affected() > 0 {
            sqlx::query("UPDATE tasks SET updated_at=? WHERE id=?")
                .bind(now)
                .bind(task_id.0.to_string())
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        Ok(())
    }

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id=?")
            .bind(task_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        sqlx::query("DELETE FROM task_assignees WHERE task_id=?")
            .bind(task_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete_tasks_in_project(&self, project_id: &ProjectId) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM task_assignees WHERE task_id IN
               (SELECT id FROM tasks WHERE project_id=?)",
        )
        .bind(project_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        sqlx::query("DELETE FROM tasks WHERE project_id=?")
            .bind(project_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    // ───────────────────────────── Task requests ─────────────────────────────

    async fn create_task_request(
        &self,
        params: &CreateTaskRequestParams,
    ) -> Result<TaskRequest, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO task_requests(id,task_code,task_id,requested_by,status,message,
                                       responded_at,responded_by,created_at,updated_at)
             VALUES(?,?,?,?,'pending',?,NULL,NULL,?,?)",
        )
        .bind(id.to_string())
        .bind(params.task_code.as_str())
        .bind(params.task_id.0.to_string())
        .bind(params.requested_by.0.to_string())
        .bind(&params.message)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;
        self.get_task_request(&RequestId(id)).await
    }

    async fn get_task_request(&self, request_id: &RequestId) -> Result<TaskRequest, StoreError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLS} FROM task_requests WHERE id=?"
        ))
        .bind(request_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => request_from_row(row),
        }
    }

    async fn find_pending_request(
        &self,
        task_id: &TaskId,
        requested_by: &UserId,
    ) -> Result<Option<TaskRequest>, StoreError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLS} FROM task_requests
             WHERE task_id=? AND requested_by=? AND status='pending'"
        ))
        .bind(task_id.0.to_string())
        .bind(requested_by.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.map(request_from_row).transpose()
    }

    async fn list_requests_for_tasks(
        &self,
        task_ids: &[TaskId],
    ) -> Result<Vec<TaskRequest>, StoreError> {
        if task_ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT {REQUEST_COLS} FROM task_requests WHERE task_id IN ({})
             ORDER BY created_at DESC, id DESC",
            placeholders(task_ids.len())
        );
        let mut query = sqlx::query_as::<_, RequestRow>(&sql);
        for task_id in task_ids {
            query = query.bind(task_id.0.to_string());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(backend)?;
        rows.into_iter().map(request_from_row).collect()
    }

    async fn record_request_response(
        &self,
        request_id: &RequestId,
        response: &RequestResponse,
    ) -> Result<TaskRequest, StoreError> {
        // Guarded by status so exactly one responder can win the transition.
        let result = sqlx::query(
            "UPDATE task_requests SET status=?, responded_at=?, responded_by=?, updated_at=?
             WHERE id=? AND status='pending'",
        )
        .bind(response.status.as_str())
        .bind(response.responded_at.timestamp())
        .bind(response.responded_by.0.to_string())
        .bind(Utc::now().timestamp())
        .bind(request_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if result.rows_affected() == 0 {
            // Either the request is gone or it is no longer pending.
            return match self.get_task_request(request_id).await {
                Ok(_) => Err(StoreError::Conflict),
                Err(e) => Err(e),
            };
        }
        self.get_task_request(request_id).await
    }

    // ───────────────────────────── Chat ─────────────────────────────

    async fn create_chat_message(
        &self,
        params: &CreateChatMessageParams,
    ) -> Result<ChatMessage, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO chat_messages(id,task_id,sender,message,message_type,created_at)
             VALUES(?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.task_id.0.to_string())
        .bind(params.sender.0.to_string())
        .bind(&params.message)
        .bind(params.message_type.as_str())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        let row = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {CHAT_COLS} FROM chat_messages WHERE id=?"
        ))
        .bind(id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        chat_from_row(row)
    }

    async fn list_chat_messages(&self, task_id: &TaskId) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {CHAT_COLS} FROM chat_messages WHERE task_id=?
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(task_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter().map(chat_from_row).collect()
    }
}
