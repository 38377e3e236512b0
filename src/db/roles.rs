//! Database operations for roles, permissions and their assignments.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;

use crate::error::AppResult;
use crate::models::{Permission, Role};
use crate::pagination::{Page, PageRequest, fetch_page};

/// A role name joined with one of its granted permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role: String,
    pub resource: String,
    pub action: String,
}

/// Insert a new role.
pub async fn insert(
    db: &DatabaseConnection,
    name: &str,
    description: Option<&str>,
) -> AppResult<Role> {
    let model = crate::entity::role::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description.map(|s| s.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_role(inserted))
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Option<Role>> {
    let result = crate::entity::role::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_role))
}

pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Option<Role>> {
    let result = crate::entity::role::Entity::find()
        .filter(crate::entity::role::Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(result.map(model_to_role))
}

pub async fn list(db: &DatabaseConnection, request: &PageRequest) -> AppResult<Page<Role>> {
    let select = crate::entity::role::Entity::find();
    let page = fetch_page(db, select, crate::entity::role::Column::Id, request).await?;
    Ok(page.map(model_to_role))
}

/// Delete a role together with its grants and user assignments.
pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    let txn = db.begin().await?;

    crate::entity::role_permission::Entity::delete_many()
        .filter(crate::entity::role_permission::Column::RoleId.eq(id))
        .exec(&txn)
        .await?;
    crate::entity::user_role::Entity::delete_many()
        .filter(crate::entity::user_role::Column::RoleId.eq(id))
        .exec(&txn)
        .await?;
    let result = crate::entity::role::Entity::delete_by_id(id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result.rows_affected > 0)
}

/// Permissions granted to a role, ordered by id.
pub async fn permissions_for_role<C: ConnectionTrait>(
    db: &C,
    role_id: i32,
) -> AppResult<Vec<Permission>> {
    let permission_ids: Vec<i32> = crate::entity::role_permission::Entity::find()
        .filter(crate::entity::role_permission::Column::RoleId.eq(role_id))
        .all(db)
        .await?
        .into_iter()
        .map(|rp| rp.permission_id)
        .collect();

    if permission_ids.is_empty() {
        return Ok(Vec::new());
    }

    let results = crate::entity::permission::Entity::find()
        .filter(crate::entity::permission::Column::Id.is_in(permission_ids))
        .order_by_asc(crate::entity::permission::Column::Id)
        .all(db)
        .await?;

    Ok(results.into_iter().map(model_to_permission).collect())
}

/// Find a permission by its pair, creating it if absent.
pub async fn find_or_create_permission(
    db: &DatabaseConnection,
    resource: &str,
    action: &str,
    description: Option<&str>,
) -> AppResult<Permission> {
    let existing = crate::entity::permission::Entity::find()
        .filter(crate::entity::permission::Column::Resource.eq(resource))
        .filter(crate::entity::permission::Column::Action.eq(action))
        .one(db)
        .await?;

    if let Some(m) = existing {
        return Ok(model_to_permission(m));
    }

    let model = crate::entity::permission::ActiveModel {
        resource: Set(resource.to_string()),
        action: Set(action.to_string()),
        description: Set(description.map(|s| s.to_string())),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_permission(inserted))
}

/// Grant a permission to a role. Returns false if it was already granted.
pub async fn grant(db: &DatabaseConnection, role_id: i32, permission_id: i32) -> AppResult<bool> {
    let existing = crate::entity::role_permission::Entity::find_by_id((role_id, permission_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    crate::entity::role_permission::Entity::insert(crate::entity::role_permission::ActiveModel {
        role_id: Set(role_id),
        permission_id: Set(permission_id),
    })
    .exec_without_returning(db)
    .await?;

    Ok(true)
}

/// Revoke a permission from a role. Returns false if it was not granted.
pub async fn revoke(db: &DatabaseConnection, role_id: i32, permission_id: i32) -> AppResult<bool> {
    let result = crate::entity::role_permission::Entity::delete_by_id((role_id, permission_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Roles assigned to a user, ordered by id.
pub async fn roles_for_user<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<Vec<Role>> {
    let role_ids: Vec<i32> = crate::entity::user_role::Entity::find()
        .filter(crate::entity::user_role::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|ur| ur.role_id)
        .collect();

    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    let results = crate::entity::role::Entity::find()
        .filter(crate::entity::role::Column::Id.is_in(role_ids))
        .order_by_asc(crate::entity::role::Column::Id)
        .all(db)
        .await?;

    Ok(results.into_iter().map(model_to_role).collect())
}

/// Assign a role to a user. Returns false if it was already assigned.
pub async fn assign_to_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    role_id: i32,
) -> AppResult<bool> {
    let existing = crate::entity::user_role::Entity::find_by_id((user_id, role_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    crate::entity::user_role::Entity::insert(crate::entity::user_role::ActiveModel {
        user_id: Set(user_id),
        role_id: Set(role_id),
    })
    .exec_without_returning(db)
    .await?;

    Ok(true)
}

/// Remove a role from a user. Returns false if it was not assigned.
pub async fn remove_from_user(
    db: &DatabaseConnection,
    user_id: i32,
    role_id: i32,
) -> AppResult<bool> {
    let result = crate::entity::user_role::Entity::delete_by_id((user_id, role_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Every `(role, resource, action)` grant in the database.
pub async fn all_grants(db: &DatabaseConnection) -> AppResult<Vec<RoleGrant>> {
    let roles: HashMap<i32, String> = crate::entity::role::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    let permissions: HashMap<i32, (String, String)> = crate::entity::permission::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, (p.resource, p.action)))
        .collect();

    let links = crate::entity::role_permission::Entity::find()
        .all(db)
        .await?;

    let grants = links
        .into_iter()
        .filter_map(|link| {
            let role = roles.get(&link.role_id)?;
            let (resource, action) = permissions.get(&link.permission_id)?;
            Some(RoleGrant {
                role: role.clone(),
                resource: resource.clone(),
                action: action.clone(),
            })
        })
        .collect();

    Ok(grants)
}

pub(crate) fn model_to_role(m: crate::entity::role::Model) -> Role {
    Role {
        id: m.id,
        name: m.name,
        description: m.description,
        created_at: m.created_at,
    }
}

fn model_to_permission(m: crate::entity::permission::Model) -> Permission {
    Permission {
        id: m.id,
        resource: m.resource,
        action: m.action,
        description: m.description,
    }
}
