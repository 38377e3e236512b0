//! API key management endpoints.
//!
//! Users manage their own keys; managing anyone else's needs `manage` on
//! `api_keys`.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ApiKeyCreateResponse, ApiKeyListItem, AuthenticatedCaller, CreateApiKeyRequest};
use crate::rbac::{self, PolicyEnforcer, actions, resources};
use crate::services::api_key;

/// Response for listing API keys.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListApiKeysResponse {
    pub keys: Vec<ApiKeyListItem>,
}

/// Configure API key routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_api_key)
        .service(list_api_keys)
        .service(revoke_api_key);
}

fn require_key_owner(
    enforcer: &PolicyEnforcer,
    caller: &AuthenticatedCaller,
    user_id: i32,
) -> AppResult<()> {
    if caller.is_user(user_id) {
        return Ok(());
    }
    rbac::require(enforcer, caller, resources::API_KEYS, actions::MANAGE)
}

/// Create an API key for a user. The full key is only returned here.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/api-keys",
    tag = "API Keys",
    params(("id" = i32, Path, description = "User id")),
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "API key created", body = ApiKeyCreateResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/users/{id}/api-keys")]
pub async fn create_api_key(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    body: web::Json<CreateApiKeyRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    require_key_owner(&enforcer, &auth.caller, user_id)?;

    let (full_key, key) = api_key::create_key(
        pool.get_ref(),
        user_id,
        &body.name,
        body.expires_in.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(ApiKeyCreateResponse {
        id: key.id,
        user_id: key.user_id,
        key: full_key,
        key_prefix: key.key_prefix,
        name: key.name,
        expires_at: key.expires_at.map(|d| d.to_rfc3339()),
        created_at: key.created_at.to_rfc3339(),
    }))
}

/// List a user's API keys, newest first. Keys are masked.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/api-keys",
    tag = "API Keys",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "API keys", body = ListApiKeysResponse)
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/users/{id}/api-keys")]
pub async fn list_api_keys(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    require_key_owner(&enforcer, &auth.caller, user_id)?;

    let keys = api_key::list_keys(pool.get_ref(), user_id).await?;
    let keys = keys.into_iter().map(ApiKeyListItem::from).collect();
    Ok(HttpResponse::Ok().json(ListApiKeysResponse { keys }))
}

/// Revoke an API key.
#[utoipa::path(
    delete,
    path = "/api/v1/api-keys/{id}",
    tag = "API Keys",
    params(("id" = i32, Path, description = "API key id")),
    responses(
        (status = 204, description = "API key revoked"),
        (status = 404, description = "API key not found or already revoked")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/api-keys/{id}")]
pub async fn revoke_api_key(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let key = api_key::get_key(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("API key {}", id)))?;
    require_key_owner(&enforcer, &auth.caller, key.user_id)?;

    if !api_key::revoke_key(pool.get_ref(), id).await? {
        return Err(AppError::NotFound(format!("Active API key {}", id)));
    }
    Ok(HttpResponse::NoContent().finish())
}
