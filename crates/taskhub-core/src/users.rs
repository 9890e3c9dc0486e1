//! User profile operations. Registration and credential verification belong
//! to the auth layer; the password hash is an opaque string here.

use taskhub_storage::{Store, User, UserCounts, UserId, UserUpdate};
use tracing::info;

use crate::access::require_admin;
use crate::error::{not_found_as, CoreError, CoreResult};
use crate::Principal;

/// Aggregate user counts for the admin dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total_users: u64,
    pub admin_count: u64,
    pub user_count: u64,
    pub with_access_code: u64,
    pub without_access_code: u64,
}

impl From<UserCounts> for UserStats {
    fn from(c: UserCounts) -> Self {
        UserStats {
            total_users: c.total,
            admin_count: c.admins,
            user_count: c.users,
            with_access_code: c.with_access_code,
            without_access_code: c.total - c.with_access_code,
        }
    }
}

pub async fn list_users(store: &dyn Store, principal: &Principal) -> CoreResult<Vec<User>> {
    require_admin(principal)?;
    Ok(store.list_users().await?)
}

pub async fn get_user(store: &dyn Store, user_id: &UserId) -> CoreResult<User> {
    store
        .get_user(user_id)
        .await
        .map_err(not_found_as("User not found"))
}

pub async fn find_users_by_access_code(
    store: &dyn Store,
    principal: &Principal,
    access_code: &str,
) -> CoreResult<Vec<User>> {
    require_admin(principal)?;
    Ok(store.find_users_by_access_code(access_code).await?)
}

/// Update a profile. Users may update themselves; admins may update anyone.
pub async fn update_profile(
    store: &dyn Store,
    principal: &Principal,
    user_id: &UserId,
    update: UserUpdate,
) -> CoreResult<User> {
    store
        .get_user(user_id)
        .await
        .map_err(not_found_as("User not found"))?;
    if principal.id != *user_id && !principal.is_admin() {
        return Err(CoreError::forbidden("Not authorized to update this user"));
    }
    Ok(store.update_user(user_id, &update).await?)
}

/// Replace a user's access-code label. Admin only.
pub async fn set_access_code(
    store: &dyn Store,
    principal: &Principal,
    user_id: &UserId,
    access_code: Option<String>,
) -> CoreResult<User> {
    require_admin(principal)?;
    store
        .get_user(user_id)
        .await
        .map_err(not_found_as("User not found"))?;
    let user = store
        .update_user(
            user_id,
            &UserUpdate {
                access_code: Some(access_code),
                ..Default::default()
            },
        )
        .await?;
    info!(user = %user.email, "access code updated");
    Ok(user)
}

/// Swap the stored (opaque) password hash. Users may rotate their own; admins
/// may rotate anyone's. Verifying the current credential is the auth layer's
/// job and happens before this is called.
pub async fn set_password_hash(
    store: &dyn Store,
    principal: &Principal,
    user_id: &UserId,
    new_hash: &str,
) -> CoreResult<()> {
    if principal.id != *user_id && !principal.is_admin() {
        return Err(CoreError::forbidden("Not authorized to update this user"));
    }
    store
        .set_user_password_hash(user_id, new_hash)
        .await
        .map_err(not_found_as("User not found"))
}

/// Delete a user. Admin only. Deliberately no cascade: tasks and requests
/// referencing the user keep their (now dangling) references.
pub async fn delete_user(
    store: &dyn Store,
    principal: &Principal,
    user_id: &UserId,
) -> CoreResult<()> {
    require_admin(principal)?;
    store
        .delete_user(user_id)
        .await
        .map_err(not_found_as("User not found"))
}

pub async fn user_stats(store: &dyn Store, principal: &Principal) -> CoreResult<UserStats> {
    require_admin(principal)?;
    Ok(store.user_counts().await?.into())
}
