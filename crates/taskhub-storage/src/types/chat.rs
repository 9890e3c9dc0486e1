//! Task chat types. Append-only log; no ordering guarantees beyond creation
//! time and no ownership resolution beyond the authenticated sender.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{ChatMessageId, TaskId, UserId};

/// Kind of chat entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    Comment,
    Error,
    Update,
}

/// Error type for parsing MessageType from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMessageTypeError(pub String);

impl std::fmt::Display for ParseMessageTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid message type: {}", self.0)
    }
}

impl std::error::Error for ParseMessageTypeError {}

impl FromStr for MessageType {
    type Err = ParseMessageTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(MessageType::Comment),
            "error" => Ok(MessageType::Error),
            "update" => Ok(MessageType::Update),
            _ => Err(ParseMessageTypeError(s.to_string())),
        }
    }
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Comment => "comment",
            MessageType::Error => "error",
            MessageType::Update => "update",
        }
    }
}

/// Chat message record.
#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub task_id: TaskId,
    pub sender: UserId,
    pub message: String,
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
}

/// Parameters for appending a chat message
#[derive(Clone, Debug)]
pub struct CreateChatMessageParams {
    pub task_id: TaskId,
    pub sender: UserId,
    pub message: String,
    pub message_type: MessageType,
}
