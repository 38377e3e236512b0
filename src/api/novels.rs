//! Novel endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthenticatedCaller, CreateNovelRequest, Novel, NovelDetail, NovelFilter, SetIdsRequest,
    UpdateNovelRequest,
};
use crate::pagination::{PageRequest, Paginated, PaginationQuery};
use crate::rbac::{self, PolicyEnforcer, actions, resources};
use crate::services::novels;

/// Configure novel routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_novel)
        .service(list_novels)
        .service(get_novel)
        .service(update_novel)
        .service(delete_novel)
        .service(set_genres)
        .service(set_tags);
}

/// Resolve the author of a new novel.
///
/// Callers publish as themselves unless they may manage novels. The admin key
/// has no user and must name the author.
fn resolve_author(
    enforcer: &PolicyEnforcer,
    caller: &AuthenticatedCaller,
    requested: Option<i32>,
) -> AppResult<i32> {
    match (requested, caller.user_id) {
        (Some(author_id), _) if caller.is_user(author_id) => Ok(author_id),
        (Some(author_id), _) if rbac::can_manage(enforcer, caller, resources::NOVELS) => {
            Ok(author_id)
        }
        (Some(_), _) => Err(AppError::Forbidden(
            "Only novel managers may publish on behalf of another author".to_string(),
        )),
        (None, Some(user_id)) => Ok(user_id),
        (None, None) => Err(AppError::InvalidInput(
            "author_id is required when using the admin key".to_string(),
        )),
    }
}

/// Create a novel.
#[utoipa::path(
    post,
    path = "/api/v1/novels",
    tag = "Novels",
    request_body = CreateNovelRequest,
    responses(
        (status = 201, description = "Novel created", body = NovelDetail),
        (status = 400, description = "Invalid status, genre, tag or cover"),
        (status = 403, description = "Missing permission"),
        (status = 409, description = "Slug already taken")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/novels")]
pub async fn create_novel(
    auth: ApiKeyAuth,
    body: web::Json<CreateNovelRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::NOVELS, actions::CREATE)?;
    let author_id = resolve_author(&enforcer, &auth.caller, body.author_id)?;

    let detail = novels::create_novel(pool.get_ref(), author_id, &body).await?;
    Ok(HttpResponse::Created().json(detail))
}

/// List novels. Filters combine with AND.
#[utoipa::path(
    get,
    path = "/api/v1/novels",
    tag = "Novels",
    params(PaginationQuery, NovelFilter),
    responses(
        (status = 200, description = "Page of novels", body = Paginated<Novel>),
        (status = 400, description = "Invalid cursor or status filter")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/novels")]
pub async fn list_novels(
    auth: ApiKeyAuth,
    query: web::Query<PaginationQuery>,
    filter: web::Query<NovelFilter>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::NOVELS, actions::READ)?;

    let request = PageRequest::from_query(&query)?;
    let page = novels::list_novels(pool.get_ref(), &filter, &request).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

/// Get a novel with its genres and tags.
#[utoipa::path(
    get,
    path = "/api/v1/novels/{id}",
    tag = "Novels",
    params(("id" = i32, Path, description = "Novel id")),
    responses(
        (status = 200, description = "Novel details", body = NovelDetail),
        (status = 404, description = "Novel not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/novels/{id}")]
pub async fn get_novel(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::NOVELS, actions::READ)?;

    let detail = novels::get_novel_detail(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Update a novel. Only the author or a novel manager may do this.
#[utoipa::path(
    put,
    path = "/api/v1/novels/{id}",
    tag = "Novels",
    params(("id" = i32, Path, description = "Novel id")),
    request_body = UpdateNovelRequest,
    responses(
        (status = 200, description = "Novel updated", body = Novel),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Novel not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[put("/novels/{id}")]
pub async fn update_novel(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    body: web::Json<UpdateNovelRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let novel = novels::get_novel(pool.get_ref(), path.into_inner()).await?;
    rbac::require_owner(
        &enforcer,
        &auth.caller,
        resources::NOVELS,
        actions::UPDATE,
        novel.author_id,
    )?;

    let novel = novels::update_novel(pool.get_ref(), novel.id, &body).await?;
    Ok(HttpResponse::Ok().json(novel))
}

/// Soft delete a novel.
#[utoipa::path(
    delete,
    path = "/api/v1/novels/{id}",
    tag = "Novels",
    params(("id" = i32, Path, description = "Novel id")),
    responses(
        (status = 204, description = "Novel deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Novel not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/novels/{id}")]
pub async fn delete_novel(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let novel = novels::get_novel(pool.get_ref(), path.into_inner()).await?;
    rbac::require_owner(
        &enforcer,
        &auth.caller,
        resources::NOVELS,
        actions::DELETE,
        novel.author_id,
    )?;

    novels::delete_novel(pool.get_ref(), novel.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Replace a novel's genres.
#[utoipa::path(
    put,
    path = "/api/v1/novels/{id}/genres",
    tag = "Novels",
    params(("id" = i32, Path, description = "Novel id")),
    request_body = SetIdsRequest,
    responses(
        (status = 200, description = "Novel details", body = NovelDetail),
        (status = 400, description = "Unknown genre id"),
        (status = 404, description = "Novel not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[put("/novels/{id}/genres")]
pub async fn set_genres(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    body: web::Json<SetIdsRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let novel = novels::get_novel(pool.get_ref(), path.into_inner()).await?;
    rbac::require_owner(
        &enforcer,
        &auth.caller,
        resources::NOVELS,
        actions::UPDATE,
        novel.author_id,
    )?;

    let detail = novels::set_genres(pool.get_ref(), novel.id, &body.ids).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Replace a novel's tags.
#[utoipa::path(
    put,
    path = "/api/v1/novels/{id}/tags",
    tag = "Novels",
    params(("id" = i32, Path, description = "Novel id")),
    request_body = SetIdsRequest,
    responses(
        (status = 200, description = "Novel details", body = NovelDetail),
        (status = 400, description = "Unknown tag id"),
        (status = 404, description = "Novel not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[put("/novels/{id}/tags")]
pub async fn set_tags(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    body: web::Json<SetIdsRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let novel = novels::get_novel(pool.get_ref(), path.into_inner()).await?;
    rbac::require_owner(
        &enforcer,
        &auth.caller,
        resources::NOVELS,
        actions::UPDATE,
        novel.author_id,
    )?;

    let detail = novels::set_tags(pool.get_ref(), novel.id, &body.ids).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{Rule, WILDCARD};

    fn caller(user_id: Option<i32>, roles: &[&str]) -> AuthenticatedCaller {
        AuthenticatedCaller {
            user_id,
            name: "test".to_string(),
            key_prefix: "nh_test0".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            is_bootstrap: false,
        }
    }

    #[test]
    fn test_resolve_author() {
        let enforcer = PolicyEnforcer::with_rules([
            Rule::new("admin", WILDCARD, WILDCARD),
            Rule::new("author", "novels", "create"),
        ]);

        let author = caller(Some(4), &["author"]);
        assert_eq!(resolve_author(&enforcer, &author, None).unwrap(), 4);
        assert_eq!(resolve_author(&enforcer, &author, Some(4)).unwrap(), 4);
        assert!(matches!(
            resolve_author(&enforcer, &author, Some(9)),
            Err(AppError::Forbidden(_))
        ));

        let admin = caller(Some(1), &["admin"]);
        assert_eq!(resolve_author(&enforcer, &admin, Some(9)).unwrap(), 9);

        let bootstrap = AuthenticatedCaller::bootstrap();
        assert_eq!(resolve_author(&enforcer, &bootstrap, Some(9)).unwrap(), 9);
        assert!(matches!(
            resolve_author(&enforcer, &bootstrap, None),
            Err(AppError::InvalidInput(_))
        ));
    }
}
