//! User management endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::ApiKeyAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserDetail};
use crate::pagination::{PageRequest, Paginated, PaginationQuery};
use crate::rbac::{self, PolicyEnforcer, actions, resources};
use crate::services::users;

/// Configure user routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_user)
        .service(list_users)
        .service(get_user)
        .service(update_user)
        .service(delete_user)
        .service(assign_role)
        .service(remove_role);
}

/// Create a user. The configured default role is granted automatically.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing permission"),
        (status = 409, description = "Username or email already taken")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/users")]
pub async fn create_user(
    auth: ApiKeyAuth,
    body: web::Json<CreateUserRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::USERS, actions::CREATE)?;

    let user = users::create_user(pool.get_ref(), &body, &config.default_role).await?;
    Ok(HttpResponse::Created().json(user))
}

/// List users, newest first by default.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of users", body = Paginated<User>),
        (status = 400, description = "Invalid cursor")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/users")]
pub async fn list_users(
    auth: ApiKeyAuth,
    query: web::Query<PaginationQuery>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::USERS, actions::READ)?;

    let request = PageRequest::from_query(&query)?;
    let page = users::list_users(pool.get_ref(), &request).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

/// Get a user with its roles and permissions.
///
/// Users may always read themselves.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User details", body = UserDetail),
        (status = 404, description = "User not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !auth.caller.is_user(id) {
        rbac::require(&enforcer, &auth.caller, resources::USERS, actions::READ)?;
    }

    let detail = users::get_user_detail(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Update a user's email or display name.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already taken")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[put("/users/{id}")]
pub async fn update_user(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if !auth.caller.is_user(id) {
        rbac::require(&enforcer, &auth.caller, resources::USERS, actions::UPDATE)?;
    }

    let user = users::update_user(pool.get_ref(), id, &body).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Soft delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::USERS, actions::DELETE)?;

    users::delete_user(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Assign a role to a user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/roles/{role_id}",
    tag = "Users",
    params(
        ("id" = i32, Path, description = "User id"),
        ("role_id" = i32, Path, description = "Role id")
    ),
    responses(
        (status = 204, description = "Role assigned"),
        (status = 404, description = "User or role not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[put("/users/{id}/roles/{role_id}")]
pub async fn assign_role(
    auth: ApiKeyAuth,
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::ROLES, actions::MANAGE)?;

    let (user_id, role_id) = path.into_inner();
    users::assign_role(pool.get_ref(), user_id, role_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a role from a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/roles/{role_id}",
    tag = "Users",
    params(
        ("id" = i32, Path, description = "User id"),
        ("role_id" = i32, Path, description = "Role id")
    ),
    responses(
        (status = 204, description = "Role removed"),
        (status = 404, description = "Role not assigned to user")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/users/{id}/roles/{role_id}")]
pub async fn remove_role(
    auth: ApiKeyAuth,
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::ROLES, actions::MANAGE)?;

    let (user_id, role_id) = path.into_inner();
    users::remove_role(pool.get_ref(), user_id, role_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
