//! User management.

use std::collections::BTreeMap;

use sea_orm::TransactionTrait;
use tracing::{info, warn};

use crate::db::{DbPool, roles as role_db, users as db};
use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, Permission, UpdateUserRequest, User, UserDetail};
use crate::pagination::{Page, PageRequest};

const MAX_USERNAME_LENGTH: usize = 64;

fn validate_username(username: &str) -> AppResult<()> {
    if username.is_empty() || username.len() > MAX_USERNAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Username must be 1-{} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(AppError::InvalidInput(
            "Username may only contain letters, digits, '_', '-' and '.'".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid email address '{}'",
            email
        ))),
    }
}

/// Create a user and grant it `default_role`.
///
/// A missing default role is logged and the user is created without roles.
pub async fn create_user(
    pool: &DbPool,
    req: &CreateUserRequest,
    default_role: &str,
) -> AppResult<User> {
    let username = req.username.trim();
    let email = req.email.trim();
    validate_username(username)?;
    validate_email(email)?;

    let txn = pool.connection().begin().await?;

    let user = db::insert(&txn, username, email, req.display_name.as_deref()).await?;

    match role_db::find_by_name(&txn, default_role).await? {
        Some(role) => {
            role_db::assign_to_user(&txn, user.id, role.id).await?;
        }
        None => warn!(
            "Default role '{}' does not exist; user {} created without roles",
            default_role, user.id
        ),
    }

    txn.commit().await?;
    info!("Created user {} ({})", user.id, user.username);
    Ok(user)
}

/// Fetch a user with its roles and the union of their permissions.
///
/// Permission aggregation is best effort: a role whose permissions cannot be
/// loaded is logged and skipped.
pub async fn get_user_detail(pool: &DbPool, id: i32) -> AppResult<UserDetail> {
    let conn = pool.connection();
    let user = db::find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))?;

    let roles = role_db::roles_for_user(conn, id).await?;

    let mut permissions: BTreeMap<i32, Permission> = BTreeMap::new();
    for role in &roles {
        match role_db::permissions_for_role(conn, role.id).await {
            Ok(granted) => {
                for permission in granted {
                    permissions.entry(permission.id).or_insert(permission);
                }
            }
            Err(e) => warn!(
                "Skipping permissions of role {} for user {}: {}",
                role.name, id, e
            ),
        }
    }

    Ok(UserDetail {
        user,
        roles: roles.into_iter().map(|r| r.name).collect(),
        permissions: permissions.into_values().collect(),
    })
}

pub async fn get_user(pool: &DbPool, id: i32) -> AppResult<User> {
    db::find_by_id(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
}

pub async fn list_users(pool: &DbPool, request: &PageRequest) -> AppResult<Page<User>> {
    db::list(pool.connection(), request).await
}

pub async fn update_user(pool: &DbPool, id: i32, req: &UpdateUserRequest) -> AppResult<User> {
    if let Some(email) = &req.email {
        validate_email(email.trim())?;
    }
    let changes = UpdateUserRequest {
        email: req.email.as_ref().map(|e| e.trim().to_string()),
        display_name: req.display_name.clone(),
    };

    db::update(pool.connection(), id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
}

pub async fn delete_user(pool: &DbPool, id: i32) -> AppResult<()> {
    if !db::soft_delete(pool.connection(), id).await? {
        return Err(AppError::NotFound(format!("User {}", id)));
    }
    info!("Deleted user {}", id);
    Ok(())
}

/// Assign a role. Assigning an already held role is a no-op.
pub async fn assign_role(pool: &DbPool, user_id: i32, role_id: i32) -> AppResult<()> {
    let conn = pool.connection();
    if !db::exists(conn, user_id).await? {
        return Err(AppError::NotFound(format!("User {}", user_id)));
    }
    if role_db::find_by_id(conn, role_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Role {}", role_id)));
    }

    if role_db::assign_to_user(conn, user_id, role_id).await? {
        info!("Assigned role {} to user {}", role_id, user_id);
    }
    Ok(())
}

pub async fn remove_role(pool: &DbPool, user_id: i32, role_id: i32) -> AppResult<()> {
    if !role_db::remove_from_user(pool.connection(), user_id, role_id).await? {
        return Err(AppError::NotFound(format!(
            "Role {} on user {}",
            role_id, user_id
        )));
    }
    info!("Removed role {} from user {}", role_id, user_id);
    Ok(())
}
