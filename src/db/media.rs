//! Database operations for media metadata.

use chrono::Utc;
use sea_orm::*;

use crate::error::AppResult;
use crate::models::{Media, MediaFilter};
use crate::pagination::{Page, PageRequest, fetch_page};

pub async fn insert(
    db: &DatabaseConnection,
    uploader_id: i32,
    file_name: &str,
    content_type: &str,
    size_bytes: i64,
    storage_key: &str,
) -> AppResult<Media> {
    let model = crate::entity::media::ActiveModel {
        uploader_id: Set(uploader_id),
        file_name: Set(file_name.to_string()),
        content_type: Set(content_type.to_string()),
        size_bytes: Set(size_bytes),
        storage_key: Set(storage_key.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_media(inserted))
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<Media>> {
    let result = crate::entity::media::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_media))
}

pub async fn list(
    db: &DatabaseConnection,
    filter: &MediaFilter,
    request: &PageRequest,
) -> AppResult<Page<Media>> {
    let mut select = crate::entity::media::Entity::find();
    if let Some(uploader_id) = filter.uploader_id {
        select = select.filter(crate::entity::media::Column::UploaderId.eq(uploader_id));
    }

    let page = fetch_page(db, select, crate::entity::media::Column::Id, request).await?;
    Ok(page.map(model_to_media))
}

/// Delete a media row, clearing it from any novel that uses it as a cover.
pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    let txn = db.begin().await?;

    let covers = crate::entity::novel::Entity::find()
        .filter(crate::entity::novel::Column::CoverMediaId.eq(id))
        .all(&txn)
        .await?;
    for novel in covers {
        let mut active: crate::entity::novel::ActiveModel = novel.into();
        active.cover_media_id = Set(None);
        active.update(&txn).await?;
    }

    let result = crate::entity::media::Entity::delete_by_id(id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result.rows_affected > 0)
}

fn model_to_media(m: crate::entity::media::Model) -> Media {
    Media {
        id: m.id,
        uploader_id: m.uploader_id,
        file_name: m.file_name,
        content_type: m.content_type,
        size_bytes: m.size_bytes,
        storage_key: m.storage_key,
        created_at: m.created_at,
    }
}
