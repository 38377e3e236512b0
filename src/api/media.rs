//! Media metadata endpoints.

use actix_web::{HttpResponse, delete, get, post, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Media, MediaFilter, RegisterMediaRequest};
use crate::pagination::{PageRequest, Paginated, PaginationQuery};
use crate::rbac::{self, PolicyEnforcer, actions, resources};
use crate::services::media;

/// Configure media routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register_media)
        .service(list_media)
        .service(get_media)
        .service(delete_media);
}

/// Register an uploaded file's metadata for the calling user.
#[utoipa::path(
    post,
    path = "/api/v1/media",
    tag = "Media",
    request_body = RegisterMediaRequest,
    responses(
        (status = 201, description = "Media registered", body = Media),
        (status = 400, description = "Invalid file name, content type or size")
    ),
    security(("api_key" = []))
)]
#[post("/media")]
pub async fn register_media(
    auth: ApiKeyAuth,
    body: web::Json<RegisterMediaRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::MEDIA, actions::CREATE)?;
    let uploader_id = auth.caller.user_id.ok_or_else(|| {
        AppError::InvalidInput("Media must be registered with a user API key".to_string())
    })?;

    let registered = media::register_media(pool.get_ref(), uploader_id, &body).await?;
    Ok(HttpResponse::Created().json(registered))
}

#[utoipa::path(
    get,
    path = "/api/v1/media",
    tag = "Media",
    params(PaginationQuery, MediaFilter),
    responses(
        (status = 200, description = "Page of media", body = Paginated<Media>),
        (status = 400, description = "Invalid cursor")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/media")]
pub async fn list_media(
    auth: ApiKeyAuth,
    query: web::Query<PaginationQuery>,
    filter: web::Query<MediaFilter>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::MEDIA, actions::READ)?;

    let request = PageRequest::from_query(&query)?;
    let page = media::list_media(pool.get_ref(), &filter, &request).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/media/{id}",
    tag = "Media",
    params(("id" = i32, Path, description = "Media id")),
    responses(
        (status = 200, description = "Media", body = Media),
        (status = 404, description = "Media not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/media/{id}")]
pub async fn get_media(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::MEDIA, actions::READ)?;

    let item = media::get_media(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// Delete media metadata. Novels using it as a cover lose the cover.
#[utoipa::path(
    delete,
    path = "/api/v1/media/{id}",
    tag = "Media",
    params(("id" = i32, Path, description = "Media id")),
    responses(
        (status = 204, description = "Media deleted"),
        (status = 403, description = "Not the uploader"),
        (status = 404, description = "Media not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/media/{id}")]
pub async fn delete_media(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let item = media::get_media(pool.get_ref(), path.into_inner()).await?;
    rbac::require_owner(
        &enforcer,
        &auth.caller,
        resources::MEDIA,
        actions::DELETE,
        item.uploader_id,
    )?;

    media::delete_media(pool.get_ref(), item.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
