//! Novel publishing rules.

use std::collections::BTreeSet;

use tracing::info;

use crate::db::novels::{NewNovel, NovelChanges};
use crate::db::{DbPool, genres as genre_db, novels as db, tags as tag_db};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateNovelRequest, Novel, NovelDetail, NovelFilter, NovelStatus, UpdateNovelRequest,
};
use crate::pagination::{Page, PageRequest};
use crate::services::taxonomy::require_slug;

const MAX_TITLE_LENGTH: usize = 200;

fn validate_title(title: &str) -> AppResult<()> {
    if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Title must be 1-{} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// Parse a status, naming the allowed values on failure.
pub fn parse_status(raw: &str) -> AppResult<NovelStatus> {
    NovelStatus::parse(raw).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Invalid status '{}'. Expected one of: draft, ongoing, completed, hiatus",
            raw
        ))
    })
}

/// Sorted, de-duplicated copy of `ids`.
fn unique_ids(ids: &[i32]) -> Vec<i32> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Fail unless every id names an existing genre.
async fn check_genres(pool: &DbPool, ids: &[i32]) -> AppResult<()> {
    let found: BTreeSet<i32> = genre_db::find_by_ids(pool.connection(), ids)
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect();
    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !found.contains(*id))
        .map(|id| id.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Unknown genre ids: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

async fn check_tags(pool: &DbPool, ids: &[i32]) -> AppResult<()> {
    let found: BTreeSet<i32> = tag_db::find_by_ids(pool.connection(), ids)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !found.contains(*id))
        .map(|id| id.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Unknown tag ids: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

async fn check_cover(pool: &DbPool, media_id: i32) -> AppResult<()> {
    if crate::db::media::find_by_id(pool.connection(), media_id)
        .await?
        .is_none()
    {
        return Err(AppError::InvalidInput(format!(
            "Unknown cover media id {}",
            media_id
        )));
    }
    Ok(())
}

/// Create a novel owned by `author_id`.
pub async fn create_novel(
    pool: &DbPool,
    author_id: i32,
    req: &CreateNovelRequest,
) -> AppResult<NovelDetail> {
    let title = req.title.trim();
    validate_title(title)?;
    let slug = require_slug(title)?;
    let status = match req.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => NovelStatus::default(),
    };

    let conn = pool.connection();
    if !crate::db::users::exists(conn, author_id).await? {
        return Err(AppError::InvalidInput(format!(
            "Unknown author id {}",
            author_id
        )));
    }
    if db::slug_exists(conn, &slug).await? {
        return Err(AppError::Conflict(format!(
            "A novel with slug '{}' already exists",
            slug
        )));
    }

    let genre_ids = unique_ids(&req.genre_ids);
    let tag_ids = unique_ids(&req.tag_ids);
    check_genres(pool, &genre_ids).await?;
    check_tags(pool, &tag_ids).await?;
    if let Some(media_id) = req.cover_media_id {
        check_cover(pool, media_id).await?;
    }

    let novel = db::insert(
        conn,
        NewNovel {
            author_id,
            title: title.to_string(),
            slug,
            synopsis: req.synopsis.clone(),
            status: status.as_str().to_string(),
            cover_media_id: req.cover_media_id,
        },
        &genre_ids,
        &tag_ids,
    )
    .await?;

    info!(
        "Created novel {} ({}) for author {}",
        novel.id, novel.slug, author_id
    );
    detail(pool, novel).await
}

pub async fn get_novel(pool: &DbPool, id: i32) -> AppResult<Novel> {
    db::find_by_id(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Novel {}", id)))
}

pub async fn get_novel_detail(pool: &DbPool, id: i32) -> AppResult<NovelDetail> {
    let novel = get_novel(pool, id).await?;
    detail(pool, novel).await
}

async fn detail(pool: &DbPool, novel: Novel) -> AppResult<NovelDetail> {
    let conn = pool.connection();
    let genres = db::genres_for(conn, novel.id).await?;
    let tags = db::tags_for(conn, novel.id).await?;
    Ok(NovelDetail {
        novel,
        genres,
        tags,
    })
}

pub async fn list_novels(
    pool: &DbPool,
    filter: &NovelFilter,
    request: &PageRequest,
) -> AppResult<Page<Novel>> {
    let mut filter = filter.clone();
    if let Some(raw) = filter.status.as_deref() {
        filter.status = Some(parse_status(raw)?.as_str().to_string());
    }

    db::list(pool.connection(), &filter, request).await
}

pub async fn update_novel(pool: &DbPool, id: i32, req: &UpdateNovelRequest) -> AppResult<Novel> {
    let title = req.title.as_deref().map(str::trim);
    if let Some(title) = title {
        validate_title(title)?;
    }
    let status = req.status.as_deref().map(parse_status).transpose()?;
    if let Some(media_id) = req.cover_media_id {
        check_cover(pool, media_id).await?;
    }

    let changes = NovelChanges {
        title: title.map(str::to_string),
        synopsis: req.synopsis.clone(),
        status: status.map(|s| s.as_str().to_string()),
        cover_media_id: req.cover_media_id,
    };

    db::update(pool.connection(), id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Novel {}", id)))
}

pub async fn delete_novel(pool: &DbPool, id: i32) -> AppResult<()> {
    if !db::soft_delete(pool.connection(), id).await? {
        return Err(AppError::NotFound(format!("Novel {}", id)));
    }
    info!("Deleted novel {}", id);
    Ok(())
}

pub async fn set_genres(pool: &DbPool, id: i32, genre_ids: &[i32]) -> AppResult<NovelDetail> {
    let novel = get_novel(pool, id).await?;
    let genre_ids = unique_ids(genre_ids);
    check_genres(pool, &genre_ids).await?;

    db::set_genres(pool.connection(), id, &genre_ids).await?;
    detail(pool, novel).await
}

pub async fn set_tags(pool: &DbPool, id: i32, tag_ids: &[i32]) -> AppResult<NovelDetail> {
    let novel = get_novel(pool, id).await?;
    let tag_ids = unique_ids(tag_ids);
    check_tags(pool, &tag_ids).await?;

    db::set_tags(pool.connection(), id, &tag_ids).await?;
    detail(pool, novel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Ongoing").unwrap(), NovelStatus::Ongoing);
        assert_eq!(parse_status(" hiatus ").unwrap(), NovelStatus::Hiatus);
        assert!(matches!(
            parse_status("abandoned"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unique_ids() {
        assert_eq!(unique_ids(&[3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert!(unique_ids(&[]).is_empty());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("A Tale").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
    }
}
