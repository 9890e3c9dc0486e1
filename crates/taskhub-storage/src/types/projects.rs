//! Project types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{ProjectCode, ProjectId, UserId};

/// Project lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

/// Error type for parsing ProjectStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProjectStatusError(pub String);

impl std::fmt::Display for ParseProjectStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid project status: {}", self.0)
    }
}

impl std::error::Error for ParseProjectStatusError {}

impl FromStr for ProjectStatus {
    type Err = ParseProjectStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "on-hold" => Ok(ProjectStatus::OnHold),
            _ => Err(ParseProjectStatusError(s.to_string())),
        }
    }
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on-hold",
        }
    }
}

/// Project record.
///
/// `code` and `created_by` are fixed at creation; all authorization for the
/// project and its tasks derives from `created_by`.
#[derive(Clone, Debug)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub code: ProjectCode,
    pub created_by: UserId,
    pub deadline: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a project
#[derive(Clone, Debug)]
pub struct CreateProjectParams {
    pub name: String,
    pub description: String,
    pub code: ProjectCode,
    pub created_by: UserId,
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial project update; `None` fields are left unchanged.
/// The code and owner are immutable and deliberately absent here.
#[derive(Clone, Debug, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub deadline: Option<DateTime<Utc>>,
}
