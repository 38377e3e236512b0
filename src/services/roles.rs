//! Role and permission management. Every mutation reloads the policy enforcer.

use tracing::info;

use crate::db::{DbPool, roles as db};
use crate::error::{AppError, AppResult};
use crate::models::{CreateRoleRequest, GrantPermissionRequest, Role, RoleDetail};
use crate::pagination::{Page, PageRequest};
use crate::rbac::{PolicyEnforcer, WILDCARD};

fn validate_name(kind: &str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", kind)));
    }
    if value != WILDCARD
        && !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(AppError::InvalidInput(format!(
            "{} '{}' may only contain lowercase letters, digits and '_'",
            kind, value
        )));
    }
    Ok(())
}

pub async fn create_role(
    pool: &DbPool,
    enforcer: &PolicyEnforcer,
    req: &CreateRoleRequest,
) -> AppResult<Role> {
    let name = req.name.trim();
    if name == WILDCARD {
        return Err(AppError::InvalidInput(
            "Role name cannot be a wildcard".to_string(),
        ));
    }
    validate_name("Role name", name)?;

    let role = db::insert(pool.connection(), name, req.description.as_deref()).await?;
    enforcer.reload(pool).await?;

    info!("Created role {} ({})", role.id, role.name);
    Ok(role)
}

pub async fn get_role(pool: &DbPool, id: i32) -> AppResult<RoleDetail> {
    let conn = pool.connection();
    let role = db::find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {}", id)))?;
    let permissions = db::permissions_for_role(conn, id).await?;

    Ok(RoleDetail { role, permissions })
}

pub async fn list_roles(pool: &DbPool, request: &PageRequest) -> AppResult<Page<Role>> {
    db::list(pool.connection(), request).await
}

pub async fn delete_role(pool: &DbPool, enforcer: &PolicyEnforcer, id: i32) -> AppResult<()> {
    if !db::delete(pool.connection(), id).await? {
        return Err(AppError::NotFound(format!("Role {}", id)));
    }
    enforcer.reload(pool).await?;

    info!("Deleted role {}", id);
    Ok(())
}

/// Grant `(resource, action)` to a role, creating the permission if needed.
pub async fn grant_permission(
    pool: &DbPool,
    enforcer: &PolicyEnforcer,
    role_id: i32,
    req: &GrantPermissionRequest,
) -> AppResult<RoleDetail> {
    let resource = req.resource.trim();
    let action = req.action.trim();
    validate_name("Resource", resource)?;
    validate_name("Action", action)?;

    let conn = pool.connection();
    if db::find_by_id(conn, role_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Role {}", role_id)));
    }

    let permission =
        db::find_or_create_permission(conn, resource, action, req.description.as_deref()).await?;
    if db::grant(conn, role_id, permission.id).await? {
        enforcer.reload(pool).await?;
        info!("Granted {}:{} to role {}", resource, action, role_id);
    }

    get_role(pool, role_id).await
}

pub async fn revoke_permission(
    pool: &DbPool,
    enforcer: &PolicyEnforcer,
    role_id: i32,
    permission_id: i32,
) -> AppResult<()> {
    if !db::revoke(pool.connection(), role_id, permission_id).await? {
        return Err(AppError::NotFound(format!(
            "Permission {} on role {}",
            permission_id, role_id
        )));
    }
    enforcer.reload(pool).await?;

    info!("Revoked permission {} from role {}", permission_id, role_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Resource", "novels").is_ok());
        assert!(validate_name("Resource", "api_keys").is_ok());
        assert!(validate_name("Action", "*").is_ok());
        assert!(validate_name("Action", "").is_err());
        assert!(validate_name("Action", "Read").is_err());
        assert!(validate_name("Action", "read all").is_err());
    }
}
