//! Genres, tags and slug generation.

use tracing::info;

use crate::db::{DbPool, genres as genre_db, tags as tag_db};
use crate::error::{AppError, AppResult};
use crate::models::{CreateGenreRequest, CreateTagRequest, Genre, Tag};
use crate::pagination::{Page, PageRequest};

/// Longest slug kept; longer input is cut at a word boundary when possible.
const MAX_SLUG_LENGTH: usize = 80;

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        if let Some(cut) = slug.rfind('-') {
            slug.truncate(cut);
        }
    }

    slug
}

/// Slug for `name`, rejecting names that produce none.
pub fn require_slug(name: &str) -> AppResult<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "'{}' must contain at least one letter or digit",
            name
        )));
    }
    Ok(slug)
}

pub async fn create_genre(pool: &DbPool, req: &CreateGenreRequest) -> AppResult<Genre> {
    let name = req.name.trim();
    let slug = require_slug(name)?;

    let genre = genre_db::insert(pool.connection(), name, &slug, req.description.as_deref()).await?;
    info!("Created genre {} ({})", genre.id, genre.slug);
    Ok(genre)
}

pub async fn get_genre(pool: &DbPool, id: i32) -> AppResult<Genre> {
    genre_db::find_by_id(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Genre {}", id)))
}

pub async fn list_genres(pool: &DbPool, request: &PageRequest) -> AppResult<Page<Genre>> {
    genre_db::list(pool.connection(), request).await
}

pub async fn delete_genre(pool: &DbPool, id: i32) -> AppResult<()> {
    if !genre_db::delete(pool.connection(), id).await? {
        return Err(AppError::NotFound(format!("Genre {}", id)));
    }
    info!("Deleted genre {}", id);
    Ok(())
}

pub async fn create_tag(pool: &DbPool, req: &CreateTagRequest) -> AppResult<Tag> {
    let name = req.name.trim();
    let slug = require_slug(name)?;

    let tag = tag_db::insert(pool.connection(), name, &slug).await?;
    info!("Created tag {} ({})", tag.id, tag.slug);
    Ok(tag)
}

pub async fn get_tag(pool: &DbPool, id: i32) -> AppResult<Tag> {
    tag_db::find_by_id(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag {}", id)))
}

pub async fn list_tags(pool: &DbPool, request: &PageRequest) -> AppResult<Page<Tag>> {
    tag_db::list(pool.connection(), request).await
}

pub async fn delete_tag(pool: &DbPool, id: i32) -> AppResult<()> {
    if !tag_db::delete(pool.connection(), id).await? {
        return Err(AppError::NotFound(format!("Tag {}", id)));
    }
    info!("Deleted tag {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Night Watch"), "the-night-watch");
        assert_eq!(slugify("  Sci-Fi & Fantasy!! "), "sci-fi-fantasy");
        assert_eq!(slugify("Chapter 01"), "chapter-01");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_slugify_truncates_at_word_boundary() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("word-word"));
    }

    #[test]
    fn test_require_slug_rejects_symbols() {
        assert!(matches!(require_slug("!!!"), Err(AppError::InvalidInput(_))));
        assert_eq!(require_slug("Romance").unwrap(), "romance");
    }
}
