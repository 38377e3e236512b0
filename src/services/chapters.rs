//! Chapter numbering, word counts and publication.

use chrono::Utc;
use tracing::info;

use crate::db::{DbPool, chapters as db};
use crate::error::{AppError, AppResult};
use crate::models::{Chapter, CreateChapterRequest, UpdateChapterRequest};
use crate::pagination::{Page, PageRequest};
use crate::services::novels::get_novel;

/// Whitespace separated word count, saturating at `i32::MAX`.
pub fn word_count(content: &str) -> i32 {
    i32::try_from(content.split_whitespace().count()).unwrap_or(i32::MAX)
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.is_empty() {
        return Err(AppError::InvalidInput(
            "Chapter title is required".to_string(),
        ));
    }
    Ok(())
}

/// Create a chapter. Without an explicit number it goes after the last one.
pub async fn create_chapter(
    pool: &DbPool,
    novel_id: i32,
    req: &CreateChapterRequest,
) -> AppResult<Chapter> {
    get_novel(pool, novel_id).await?;

    let title = req.title.trim();
    validate_title(title)?;

    let conn = pool.connection();
    let number = match req.number {
        Some(n) if n < 1 => {
            return Err(AppError::InvalidInput(
                "Chapter number must be at least 1".to_string(),
            ));
        }
        Some(n) => {
            if db::number_exists(conn, novel_id, n).await? {
                return Err(AppError::Conflict(format!(
                    "Chapter {} already exists in novel {}",
                    n, novel_id
                )));
            }
            n
        }
        None => next_number(db::max_number(conn, novel_id).await?).ok_or_else(|| {
            AppError::Conflict(format!(
                "Novel {} has no chapter number left after {}",
                novel_id,
                i32::MAX
            ))
        })?,
    };

    let chapter = db::insert(
        conn,
        novel_id,
        number,
        title,
        &req.content,
        word_count(&req.content),
    )
    .await?;

    info!(
        "Created chapter {} (#{}) in novel {}",
        chapter.id, chapter.number, novel_id
    );
    Ok(chapter)
}

pub async fn get_chapter(pool: &DbPool, novel_id: i32, id: i32) -> AppResult<Chapter> {
    db::find(pool.connection(), novel_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chapter {} in novel {}", id, novel_id)))
}

pub async fn list_chapters(
    pool: &DbPool,
    novel_id: i32,
    request: &PageRequest,
) -> AppResult<Page<Chapter>> {
    get_novel(pool, novel_id).await?;
    db::list_for_novel(pool.connection(), novel_id, request).await
}

/// Update title and/or body; the word count follows the body.
pub async fn update_chapter(
    pool: &DbPool,
    novel_id: i32,
    id: i32,
    req: &UpdateChapterRequest,
) -> AppResult<Chapter> {
    let title = req.title.as_deref().map(str::trim);
    if let Some(title) = title {
        validate_title(title)?;
    }
    let content = req
        .content
        .as_ref()
        .map(|body| (body.clone(), word_count(body)));

    db::update(
        pool.connection(),
        novel_id,
        id,
        title.map(str::to_string),
        content,
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Chapter {} in novel {}", id, novel_id)))
}

pub async fn delete_chapter(pool: &DbPool, novel_id: i32, id: i32) -> AppResult<()> {
    if !db::delete(pool.connection(), novel_id, id).await? {
        return Err(AppError::NotFound(format!(
            "Chapter {} in novel {}",
            id, novel_id
        )));
    }
    info!("Deleted chapter {} from novel {}", id, novel_id);
    Ok(())
}

/// Publish a chapter. Already published chapters keep their original timestamp.
pub async fn publish_chapter(pool: &DbPool, novel_id: i32, id: i32) -> AppResult<Chapter> {
    let chapter = get_chapter(pool, novel_id, id).await?;
    if chapter.published_at.is_some() {
        return Ok(chapter);
    }

    let published = db::set_published(pool.connection(), novel_id, id, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chapter {} in novel {}", id, novel_id)))?;

    info!("Published chapter {} in novel {}", id, novel_id);
    Ok(published)
}

/// Number after the current highest, or `None` once the range is exhausted.
fn next_number(highest: Option<i32>) -> Option<i32> {
    highest.unwrap_or(0).checked_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("It was a dark and stormy night."), 7);
        assert_eq!(word_count("line one\nline  two\r\n\tthree"), 5);
    }

    #[test]
    fn test_next_number() {
        assert_eq!(next_number(None), Some(1));
        assert_eq!(next_number(Some(9)), Some(10));
        assert_eq!(next_number(Some(i32::MAX)), None);
    }
}
