//! Role and permission endpoints.

use actix_web::{HttpResponse, delete, get, post, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateRoleRequest, GrantPermissionRequest, Role, RoleDetail};
use crate::pagination::{PageRequest, Paginated, PaginationQuery};
use crate::rbac::{self, PolicyEnforcer, actions, resources};
use crate::services::roles;

/// Configure role routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_role)
        .service(list_roles)
        .service(get_role)
        .service(delete_role)
        .service(grant_permission)
        .service(revoke_permission);
}

#[utoipa::path(
    post,
    path = "/api/v1/roles",
    tag = "Roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Invalid role name"),
        (status = 409, description = "Role already exists")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/roles")]
pub async fn create_role(
    auth: ApiKeyAuth,
    body: web::Json<CreateRoleRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::ROLES, actions::CREATE)?;

    let role = roles::create_role(pool.get_ref(), enforcer.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(role))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "Roles",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of roles", body = Paginated<Role>),
        (status = 400, description = "Invalid cursor")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/roles")]
pub async fn list_roles(
    auth: ApiKeyAuth,
    query: web::Query<PaginationQuery>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::ROLES, actions::READ)?;

    let request = PageRequest::from_query(&query)?;
    let page = roles::list_roles(pool.get_ref(), &request).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

/// Get a role with its granted permissions.
#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    tag = "Roles",
    params(("id" = i32, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role details", body = RoleDetail),
        (status = 404, description = "Role not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/roles/{id}")]
pub async fn get_role(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::ROLES, actions::READ)?;

    let detail = roles::get_role(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Delete a role, its grants and its user assignments.
#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    tag = "Roles",
    params(("id" = i32, Path, description = "Role id")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Role not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/roles/{id}")]
pub async fn delete_role(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::ROLES, actions::DELETE)?;

    roles::delete_role(pool.get_ref(), enforcer.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Grant a `(resource, action)` permission to a role.
#[utoipa::path(
    post,
    path = "/api/v1/roles/{id}/permissions",
    tag = "Roles",
    params(("id" = i32, Path, description = "Role id")),
    request_body = GrantPermissionRequest,
    responses(
        (status = 200, description = "Updated role", body = RoleDetail),
        (status = 400, description = "Invalid resource or action"),
        (status = 404, description = "Role not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/roles/{id}/permissions")]
pub async fn grant_permission(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    body: web::Json<GrantPermissionRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::ROLES, actions::UPDATE)?;

    let detail =
        roles::grant_permission(pool.get_ref(), enforcer.get_ref(), path.into_inner(), &body)
            .await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}/permissions/{permission_id}",
    tag = "Roles",
    params(
        ("id" = i32, Path, description = "Role id"),
        ("permission_id" = i32, Path, description = "Permission id")
    ),
    responses(
        (status = 204, description = "Permission revoked"),
        (status = 404, description = "Permission not granted to role")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/roles/{id}/permissions/{permission_id}")]
pub async fn revoke_permission(
    auth: ApiKeyAuth,
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::ROLES, actions::UPDATE)?;

    let (role_id, permission_id) = path.into_inner();
    roles::revoke_permission(pool.get_ref(), enforcer.get_ref(), role_id, permission_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
