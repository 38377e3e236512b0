//! Genre and tag endpoints.

use actix_web::{HttpResponse, delete, get, post, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateGenreRequest, CreateTagRequest, Genre, Tag};
use crate::pagination::{PageRequest, Paginated, PaginationQuery};
use crate::rbac::{self, PolicyEnforcer, actions, resources};
use crate::services::taxonomy;

/// Configure genre and tag routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_genre)
        .service(list_genres)
        .service(get_genre)
        .service(delete_genre)
        .service(create_tag)
        .service(list_tags)
        .service(get_tag)
        .service(delete_tag);
}

/// Create a genre. The slug is derived from the name.
#[utoipa::path(
    post,
    path = "/api/v1/genres",
    tag = "Genres",
    request_body = CreateGenreRequest,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Name has no usable characters"),
        (status = 409, description = "Genre already exists")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/genres")]
pub async fn create_genre(
    auth: ApiKeyAuth,
    body: web::Json<CreateGenreRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::GENRES, actions::CREATE)?;

    let genre = taxonomy::create_genre(pool.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(genre))
}

#[utoipa::path(
    get,
    path = "/api/v1/genres",
    tag = "Genres",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of genres", body = Paginated<Genre>),
        (status = 400, description = "Invalid cursor")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/genres")]
pub async fn list_genres(
    auth: ApiKeyAuth,
    query: web::Query<PaginationQuery>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::GENRES, actions::READ)?;

    let request = PageRequest::from_query(&query)?;
    let page = taxonomy::list_genres(pool.get_ref(), &request).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/genres/{id}",
    tag = "Genres",
    params(("id" = i32, Path, description = "Genre id")),
    responses(
        (status = 200, description = "Genre", body = Genre),
        (status = 404, description = "Genre not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/genres/{id}")]
pub async fn get_genre(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::GENRES, actions::READ)?;

    let genre = taxonomy::get_genre(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(genre))
}

/// Delete a genre and detach it from every novel.
#[utoipa::path(
    delete,
    path = "/api/v1/genres/{id}",
    tag = "Genres",
    params(("id" = i32, Path, description = "Genre id")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/genres/{id}")]
pub async fn delete_genre(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::GENRES, actions::DELETE)?;

    taxonomy::delete_genre(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Create a tag. The slug is derived from the name.
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    tag = "Tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 400, description = "Name has no usable characters"),
        (status = 409, description = "Tag already exists")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/tags")]
pub async fn create_tag(
    auth: ApiKeyAuth,
    body: web::Json<CreateTagRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::TAGS, actions::CREATE)?;

    let tag = taxonomy::create_tag(pool.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(tag))
}

#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "Tags",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of tags", body = Paginated<Tag>),
        (status = 400, description = "Invalid cursor")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/tags")]
pub async fn list_tags(
    auth: ApiKeyAuth,
    query: web::Query<PaginationQuery>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::TAGS, actions::READ)?;

    let request = PageRequest::from_query(&query)?;
    let page = taxonomy::list_tags(pool.get_ref(), &request).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/tags/{id}",
    tag = "Tags",
    params(("id" = i32, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = Tag),
        (status = 404, description = "Tag not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/tags/{id}")]
pub async fn get_tag(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::TAGS, actions::READ)?;

    let tag = taxonomy::get_tag(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tag))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    tag = "Tags",
    params(("id" = i32, Path, description = "Tag id")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/tags/{id}")]
pub async fn delete_tag(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::TAGS, actions::DELETE)?;

    taxonomy::delete_tag(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
