//! The authenticated actor performing an operation.

use taskhub_storage::{Role, UserId};

/// Supplied by the auth layer after credential/session verification; this core
/// treats it as ground truth and never re-checks credentials.
#[derive(Clone, Debug)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
