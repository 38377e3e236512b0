//! Chapter endpoints, nested under their novel.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{AuthenticatedCaller, Chapter, CreateChapterRequest, Novel, UpdateChapterRequest};
use crate::pagination::{PageRequest, Paginated, PaginationQuery};
use crate::rbac::{self, PolicyEnforcer, actions, resources};
use crate::services::{chapters, novels};

/// Configure chapter routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_chapter)
        .service(list_chapters)
        .service(get_chapter)
        .service(update_chapter)
        .service(delete_chapter)
        .service(publish_chapter);
}

/// Chapter writes need the chapter permission and either authorship of the
/// novel or `manage` on novels.
fn require_chapter_write(
    enforcer: &PolicyEnforcer,
    caller: &AuthenticatedCaller,
    novel: &Novel,
    action: &str,
) -> AppResult<()> {
    rbac::require(enforcer, caller, resources::CHAPTERS, action)?;

    if caller.is_user(novel.author_id) || rbac::can_manage(enforcer, caller, resources::NOVELS) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "Only the author of novel {} may {} its chapters",
        novel.id, action
    )))
}

/// Add a chapter. Without a number it is appended after the last one.
#[utoipa::path(
    post,
    path = "/api/v1/novels/{novel_id}/chapters",
    tag = "Chapters",
    params(("novel_id" = i32, Path, description = "Novel id")),
    request_body = CreateChapterRequest,
    responses(
        (status = 201, description = "Chapter created", body = Chapter),
        (status = 400, description = "Invalid chapter"),
        (status = 404, description = "Novel not found"),
        (status = 409, description = "Chapter number already taken")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/novels/{novel_id}/chapters")]
pub async fn create_chapter(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    body: web::Json<CreateChapterRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let novel = novels::get_novel(pool.get_ref(), path.into_inner()).await?;
    require_chapter_write(&enforcer, &auth.caller, &novel, actions::CREATE)?;

    let chapter = chapters::create_chapter(pool.get_ref(), novel.id, &body).await?;
    Ok(HttpResponse::Created().json(chapter))
}

#[utoipa::path(
    get,
    path = "/api/v1/novels/{novel_id}/chapters",
    tag = "Chapters",
    params(("novel_id" = i32, Path, description = "Novel id"), PaginationQuery),
    responses(
        (status = 200, description = "Page of chapters", body = Paginated<Chapter>),
        (status = 400, description = "Invalid cursor"),
        (status = 404, description = "Novel not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/novels/{novel_id}/chapters")]
pub async fn list_chapters(
    auth: ApiKeyAuth,
    path: web::Path<i32>,
    query: web::Query<PaginationQuery>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::CHAPTERS, actions::READ)?;

    let request = PageRequest::from_query(&query)?;
    let page = chapters::list_chapters(pool.get_ref(), path.into_inner(), &request).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/v1/novels/{novel_id}/chapters/{id}",
    tag = "Chapters",
    params(
        ("novel_id" = i32, Path, description = "Novel id"),
        ("id" = i32, Path, description = "Chapter id")
    ),
    responses(
        (status = 200, description = "Chapter", body = Chapter),
        (status = 404, description = "Chapter not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[get("/novels/{novel_id}/chapters/{id}")]
pub async fn get_chapter(
    auth: ApiKeyAuth,
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    rbac::require(&enforcer, &auth.caller, resources::CHAPTERS, actions::READ)?;

    let (novel_id, id) = path.into_inner();
    let chapter = chapters::get_chapter(pool.get_ref(), novel_id, id).await?;
    Ok(HttpResponse::Ok().json(chapter))
}

/// Update a chapter's title or content. The word count follows the content.
#[utoipa::path(
    put,
    path = "/api/v1/novels/{novel_id}/chapters/{id}",
    tag = "Chapters",
    params(
        ("novel_id" = i32, Path, description = "Novel id"),
        ("id" = i32, Path, description = "Chapter id")
    ),
    request_body = UpdateChapterRequest,
    responses(
        (status = 200, description = "Chapter updated", body = Chapter),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Chapter not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[put("/novels/{novel_id}/chapters/{id}")]
pub async fn update_chapter(
    auth: ApiKeyAuth,
    path: web::Path<(i32, i32)>,
    body: web::Json<UpdateChapterRequest>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let (novel_id, id) = path.into_inner();
    let novel = novels::get_novel(pool.get_ref(), novel_id).await?;
    require_chapter_write(&enforcer, &auth.caller, &novel, actions::UPDATE)?;

    let chapter = chapters::update_chapter(pool.get_ref(), novel.id, id, &body).await?;
    Ok(HttpResponse::Ok().json(chapter))
}

#[utoipa::path(
    delete,
    path = "/api/v1/novels/{novel_id}/chapters/{id}",
    tag = "Chapters",
    params(
        ("novel_id" = i32, Path, description = "Novel id"),
        ("id" = i32, Path, description = "Chapter id")
    ),
    responses(
        (status = 204, description = "Chapter deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Chapter not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[delete("/novels/{novel_id}/chapters/{id}")]
pub async fn delete_chapter(
    auth: ApiKeyAuth,
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let (novel_id, id) = path.into_inner();
    let novel = novels::get_novel(pool.get_ref(), novel_id).await?;
    require_chapter_write(&enforcer, &auth.caller, &novel, actions::DELETE)?;

    chapters::delete_chapter(pool.get_ref(), novel.id, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Publish a chapter. Publishing twice keeps the first timestamp.
#[utoipa::path(
    post,
    path = "/api/v1/novels/{novel_id}/chapters/{id}/publish",
    tag = "Chapters",
    params(
        ("novel_id" = i32, Path, description = "Novel id"),
        ("id" = i32, Path, description = "Chapter id")
    ),
    responses(
        (status = 200, description = "Chapter published", body = Chapter),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Chapter not found")
    ),
    security(("api_key" = []), ("admin_key" = []))
)]
#[post("/novels/{novel_id}/chapters/{id}/publish")]
pub async fn publish_chapter(
    auth: ApiKeyAuth,
    path: web::Path<(i32, i32)>,
    pool: web::Data<DbPool>,
    enforcer: web::Data<PolicyEnforcer>,
) -> AppResult<HttpResponse> {
    let (novel_id, id) = path.into_inner();
    let novel = novels::get_novel(pool.get_ref(), novel_id).await?;
    require_chapter_write(&enforcer, &auth.caller, &novel, actions::UPDATE)?;

    let chapter = chapters::publish_chapter(pool.get_ref(), novel.id, id).await?;
    Ok(HttpResponse::Ok().json(chapter))
}
