//! Media registration. Only metadata is stored here.

use tracing::info;
use uuid::Uuid;

use crate::db::{DbPool, media as db};
use crate::error::{AppError, AppResult};
use crate::models::{Media, MediaFilter, RegisterMediaRequest};
use crate::pagination::{Page, PageRequest};

/// Maximum media size (50 MiB).
pub const MAX_MEDIA_SIZE: i64 = 50 * 1024 * 1024;

/// Validate a file name and return rejection reason if invalid.
fn validate_file_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("Empty file name".to_string());
    }
    // Check for path traversal
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Some("File name must not contain path separators".to_string());
    }
    None
}

fn validate_content_type(content_type: &str) -> Option<String> {
    match content_type.split_once('/') {
        Some((kind, sub)) if !kind.is_empty() && !sub.is_empty() => None,
        _ => Some(format!("Invalid content type '{}'", content_type)),
    }
}

/// Object storage key for an upload: `media/{uploader}/{uuid}-{file_name}`.
pub fn storage_key(uploader_id: i32, file_name: &str) -> String {
    format!("media/{}/{}-{}", uploader_id, Uuid::now_v7(), file_name)
}

pub async fn register_media(
    pool: &DbPool,
    uploader_id: i32,
    req: &RegisterMediaRequest,
) -> AppResult<Media> {
    let file_name = req.file_name.trim();
    let content_type = req.content_type.trim().to_lowercase();

    if let Some(reason) = validate_file_name(file_name) {
        return Err(AppError::InvalidInput(reason));
    }
    if let Some(reason) = validate_content_type(&content_type) {
        return Err(AppError::InvalidInput(reason));
    }
    if req.size_bytes <= 0 || req.size_bytes > MAX_MEDIA_SIZE {
        return Err(AppError::InvalidInput(format!(
            "File size {} must be between 1 and {} bytes",
            req.size_bytes, MAX_MEDIA_SIZE
        )));
    }

    let key = storage_key(uploader_id, file_name);
    let media = db::insert(
        pool.connection(),
        uploader_id,
        file_name,
        &content_type,
        req.size_bytes,
        &key,
    )
    .await?;

    info!("Registered media {} at {}", media.id, media.storage_key);
    Ok(media)
}

pub async fn get_media(pool: &DbPool, id: i32) -> AppResult<Media> {
    db::find_by_id(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media {}", id)))
}

pub async fn list_media(
    pool: &DbPool,
    filter: &MediaFilter,
    request: &PageRequest,
) -> AppResult<Page<Media>> {
    db::list(pool.connection(), filter, request).await
}

pub async fn delete_media(pool: &DbPool, id: i32) -> AppResult<()> {
    if !db::delete(pool.connection(), id).await? {
        return Err(AppError::NotFound(format!("Media {}", id)));
    }
    info!("Deleted media {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("cover.png").is_none());
        assert!(validate_file_name("").is_some());
        assert!(validate_file_name("../etc/passwd").is_some());
        assert!(validate_file_name("dir/cover.png").is_some());
    }

    #[test]
    fn test_validate_content_type() {
        assert!(validate_content_type("image/png").is_none());
        assert!(validate_content_type("image").is_some());
        assert!(validate_content_type("/png").is_some());
    }

    #[test]
    fn test_storage_key_is_unique_per_upload() {
        let a = storage_key(4, "cover.png");
        let b = storage_key(4, "cover.png");
        assert!(a.starts_with("media/4/"));
        assert!(a.ends_with("-cover.png"));
        assert_ne!(a, b);
    }
}
