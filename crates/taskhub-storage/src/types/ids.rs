//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// User identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

/// Project identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProjectId(pub Uuid);

/// Task identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub Uuid);

/// Task access request identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

/// Chat message identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatMessageId(pub Uuid);
