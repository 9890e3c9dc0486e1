//! Task types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{ProjectId, TaskCode, TaskId, UserId};

/// Task progress status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// Error type for parsing TaskStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaskStatusError(pub String);

impl std::fmt::Display for ParseTaskStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid task status: {}", self.0)
    }
}

impl std::error::Error for ParseTaskStatusError {}

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Task priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Error type for parsing TaskPriority from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaskPriorityError(pub String);

impl std::fmt::Display for ParseTaskPriorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid task priority: {}", self.0)
    }
}

impl std::error::Error for ParseTaskPriorityError {}

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

/// Task record.
///
/// `code` and `project_id` are immutable after creation. The authorization
/// owner of a task is always its project's `created_by`; `assigned_to` grants
/// assigned-user access only.
#[derive(Clone, Debug)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub code: TaskCode,
    pub assigned_by: UserId,
    /// Set of assigned users; membership is what a regular user's access
    /// derives from.
    pub assigned_to: Vec<UserId>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub github_repo_link: String,
    /// Set once, on the first transition into `completed`.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_assigned_to(&self, user_id: &UserId) -> bool {
        self.assigned_to.contains(user_id)
    }
}

/// Parameters for creating a task
#[derive(Clone, Debug)]
pub struct CreateTaskParams {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub code: TaskCode,
    pub assigned_by: UserId,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
}

/// Partial task update; `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub github_repo_link: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    /// Written only on the first transition into `completed`; callers compute
    /// it so the stamp is never overwritten.
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn status_and_priority_roundtrip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        for priority in [
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Urgent,
        ] {
            assert_eq!(
                priority.as_str().parse::<TaskPriority>().unwrap(),
                priority
            );
        }
    }

    #[test]
    fn is_assigned_to_checks_membership() {
        let a = UserId(Uuid::new_v4());
        let b = UserId(Uuid::new_v4());
        let task = Task {
            id: TaskId(Uuid::new_v4()),
            project_id: ProjectId(Uuid::new_v4()),
            title: "t".into(),
            description: String::new(),
            code: TaskCode("TASK-1000".into()),
            assigned_by: a.clone(),
            assigned_to: vec![a.clone()],
            due_date: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            github_repo_link: String::new(),
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(task.is_assigned_to(&a));
        assert!(!task.is_assigned_to(&b));
    }
}
