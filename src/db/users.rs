//! Database operations for users.

use chrono::Utc;
use sea_orm::*;

use crate::error::AppResult;
use crate::models::{UpdateUserRequest, User};
use crate::pagination::{Page, PageRequest, fetch_page};

/// Insert a new user.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    username: &str,
    email: &str,
    display_name: Option<&str>,
) -> AppResult<User> {
    let now = Utc::now();

    let model = crate::entity::user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        display_name: Set(display_name.map(|s| s.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_user(inserted))
}

/// Find an active user by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Option<User>> {
    let result = find_active(db, id).await?;
    Ok(result.map(model_to_user))
}

/// List active users, one page at a time.
pub async fn list(db: &DatabaseConnection, request: &PageRequest) -> AppResult<Page<User>> {
    let select = crate::entity::user::Entity::find()
        .filter(crate::entity::user::Column::DeletedAt.is_null());

    let page = fetch_page(db, select, crate::entity::user::Column::Id, request).await?;
    Ok(page.map(model_to_user))
}

/// Apply a partial update. Returns `None` if the user does not exist.
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    changes: &UpdateUserRequest,
) -> AppResult<Option<User>> {
    let Some(m) = find_active(db, id).await? else {
        return Ok(None);
    };

    let mut active: crate::entity::user::ActiveModel = m.into();
    if let Some(email) = &changes.email {
        active.email = Set(email.clone());
    }
    if let Some(display_name) = &changes.display_name {
        active.display_name = Set(Some(display_name.clone()));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    Ok(Some(model_to_user(updated)))
}

/// Soft delete a user. Returns false if the user does not exist.
pub async fn soft_delete(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    let Some(m) = find_active(db, id).await? else {
        return Ok(false);
    };

    let mut active: crate::entity::user::ActiveModel = m.into();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(db).await?;
    Ok(true)
}

async fn find_active<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<crate::entity::user::Model>> {
    let result = crate::entity::user::Entity::find_by_id(id)
        .filter(crate::entity::user::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    Ok(result)
}

/// Check whether an active user exists.
pub async fn exists<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<bool> {
    Ok(find_active(db, id).await?.is_some())
}

pub(crate) fn model_to_user(m: crate::entity::user::Model) -> User {
    User {
        id: m.id,
        username: m.username,
        email: m.email,
        display_name: m.display_name,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
