//! Database operations for chapters.

use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::error::AppResult;
use crate::models::Chapter;
use crate::pagination::{Page, PageRequest, fetch_page};

pub async fn insert(
    db: &DatabaseConnection,
    novel_id: i32,
    number: i32,
    title: &str,
    content: &str,
    word_count: i32,
) -> AppResult<Chapter> {
    let now = Utc::now();

    let model = crate::entity::chapter::ActiveModel {
        novel_id: Set(novel_id),
        number: Set(number),
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        word_count: Set(word_count),
        published_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_chapter(inserted))
}

/// Find a chapter by ID within a novel.
pub async fn find(db: &DatabaseConnection, novel_id: i32, id: i32) -> AppResult<Option<Chapter>> {
    let result = crate::entity::chapter::Entity::find_by_id(id)
        .filter(crate::entity::chapter::Column::NovelId.eq(novel_id))
        .one(db)
        .await?;
    Ok(result.map(model_to_chapter))
}

/// Whether `number` is already taken in the novel.
pub async fn number_exists(db: &DatabaseConnection, novel_id: i32, number: i32) -> AppResult<bool> {
    let count = crate::entity::chapter::Entity::find()
        .filter(crate::entity::chapter::Column::NovelId.eq(novel_id))
        .filter(crate::entity::chapter::Column::Number.eq(number))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Highest chapter number in the novel, if it has any chapters.
pub async fn max_number(db: &DatabaseConnection, novel_id: i32) -> AppResult<Option<i32>> {
    let result = crate::entity::chapter::Entity::find()
        .filter(crate::entity::chapter::Column::NovelId.eq(novel_id))
        .order_by_desc(crate::entity::chapter::Column::Number)
        .one(db)
        .await?;
    Ok(result.map(|m| m.number))
}

pub async fn list_for_novel(
    db: &DatabaseConnection,
    novel_id: i32,
    request: &PageRequest,
) -> AppResult<Page<Chapter>> {
    let select = crate::entity::chapter::Entity::find()
        .filter(crate::entity::chapter::Column::NovelId.eq(novel_id));

    let page = fetch_page(db, select, crate::entity::chapter::Column::Id, request).await?;
    Ok(page.map(model_to_chapter))
}

/// Update title and/or body. `word_count` must match the new body when one is given.
pub async fn update(
    db: &DatabaseConnection,
    novel_id: i32,
    id: i32,
    title: Option<String>,
    content: Option<(String, i32)>,
) -> AppResult<Option<Chapter>> {
    let Some(m) = find_model(db, novel_id, id).await? else {
        return Ok(None);
    };

    let mut active: crate::entity::chapter::ActiveModel = m.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some((content, word_count)) = content {
        active.content = Set(content);
        active.word_count = Set(word_count);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    Ok(Some(model_to_chapter(updated)))
}

/// Set the publication timestamp.
pub async fn set_published(
    db: &DatabaseConnection,
    novel_id: i32,
    id: i32,
    published_at: DateTime<Utc>,
) -> AppResult<Option<Chapter>> {
    let Some(m) = find_model(db, novel_id, id).await? else {
        return Ok(None);
    };

    let mut active: crate::entity::chapter::ActiveModel = m.into();
    active.published_at = Set(Some(published_at));
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    Ok(Some(model_to_chapter(updated)))
}

pub async fn delete(db: &DatabaseConnection, novel_id: i32, id: i32) -> AppResult<bool> {
    let result = crate::entity::chapter::Entity::delete_many()
        .filter(crate::entity::chapter::Column::Id.eq(id))
        .filter(crate::entity::chapter::Column::NovelId.eq(novel_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

async fn find_model(
    db: &DatabaseConnection,
    novel_id: i32,
    id: i32,
) -> AppResult<Option<crate::entity::chapter::Model>> {
    let result = crate::entity::chapter::Entity::find_by_id(id)
        .filter(crate::entity::chapter::Column::NovelId.eq(novel_id))
        .one(db)
        .await?;
    Ok(result)
}

fn model_to_chapter(m: crate::entity::chapter::Model) -> Chapter {
    Chapter {
        id: m.id,
        novel_id: m.novel_id,
        number: m.number,
        title: m.title,
        content: m.content,
        word_count: m.word_count,
        published_at: m.published_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
