//! Task access request types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{RequestId, TaskCode, TaskId, UserId};

/// Request state. One-way: `pending` transitions to `approved` or `rejected`
/// exactly once and the terminal states never change again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Error type for parsing RequestStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequestStatusError(pub String);

impl std::fmt::Display for ParseRequestStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid request status: {}", self.0)
    }
}

impl std::error::Error for ParseRequestStatusError {}

impl FromStr for RequestStatus {
    type Err = ParseRequestStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(ParseRequestStatusError(s.to_string())),
        }
    }
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// An admin's decision on a pending request. Deliberately narrower than
/// [`RequestStatus`]: "pending" is not a valid decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestDecision {
    Approved,
    Rejected,
}

/// Error type for parsing RequestDecision from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequestDecisionError(pub String);

impl std::fmt::Display for ParseRequestDecisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid request decision: {}", self.0)
    }
}

impl std::error::Error for ParseRequestDecisionError {}

impl FromStr for RequestDecision {
    type Err = ParseRequestDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(RequestDecision::Approved),
            "rejected" => Ok(RequestDecision::Rejected),
            _ => Err(ParseRequestDecisionError(s.to_string())),
        }
    }
}

impl RequestDecision {
    pub fn as_status(&self) -> RequestStatus {
        match self {
            RequestDecision::Approved => RequestStatus::Approved,
            RequestDecision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// Task access request record.
///
/// `task_code` is denormalized from the task at creation time and kept even if
/// the task is later deleted; `task_id` may therefore dangle and readers must
/// treat a missing task as a handled condition, not a crash.
#[derive(Clone, Debug)]
pub struct TaskRequest {
    pub id: RequestId,
    pub task_code: TaskCode,
    pub task_id: TaskId,
    pub requested_by: UserId,
    pub status: RequestStatus,
    pub message: String,
    pub responded_at: Option<DateTime<Utc>>,
    pub responded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a task access request
#[derive(Clone, Debug)]
pub struct CreateTaskRequestParams {
    pub task_code: TaskCode,
    pub task_id: TaskId,
    pub requested_by: UserId,
    pub message: String,
}

/// The response an admin records on a pending request.
#[derive(Clone, Debug)]
pub struct RequestResponse {
    pub status: RequestStatus,
    pub responded_at: DateTime<Utc>,
    pub responded_by: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
    }

    #[test]
    fn pending_is_not_a_decision() {
        assert!("pending".parse::<RequestDecision>().is_err());
        assert_eq!(
            "approved".parse::<RequestDecision>().unwrap().as_status(),
            RequestStatus::Approved
        );
        assert_eq!(
            "rejected".parse::<RequestDecision>().unwrap().as_status(),
            RequestStatus::Rejected
        );
    }
}
