//! User types.

use chrono::{DateTime, Utc};

use super::{Role, UserId};

/// User record. The password hash is opaque to this core; hashing and
/// verification belong to the auth layer.
#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Free-form grouping label assigned by an admin; not a credential.
    pub access_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a user
#[derive(Clone, Debug)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub access_code: Option<String>,
}

/// Partial profile update; `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    /// `Some(None)` clears the access code, `Some(Some(..))` replaces it.
    pub access_code: Option<Option<String>>,
}

/// Aggregate user counts for the admin dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserCounts {
    pub total: u64,
    pub admins: u64,
    pub users: u64,
    pub with_access_code: u64,
}
