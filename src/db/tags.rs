//! Database operations for tags.

use chrono::Utc;
use sea_orm::*;

use crate::error::AppResult;
use crate::models::Tag;
use crate::pagination::{Page, PageRequest, fetch_page};

pub async fn insert(db: &DatabaseConnection, name: &str, slug: &str) -> AppResult<Tag> {
    let model = crate::entity::tag::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_tag(inserted))
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Option<Tag>> {
    let result = crate::entity::tag::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_tag))
}

/// Fetch the tags with the given ids, ordered by id. Unknown ids are skipped.
pub async fn find_by_ids<C: ConnectionTrait>(db: &C, ids: &[i32]) -> AppResult<Vec<Tag>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let results = crate::entity::tag::Entity::find()
        .filter(crate::entity::tag::Column::Id.is_in(ids.to_vec()))
        .order_by_asc(crate::entity::tag::Column::Id)
        .all(db)
        .await?;

    Ok(results.into_iter().map(model_to_tag).collect())
}

pub async fn list(db: &DatabaseConnection, request: &PageRequest) -> AppResult<Page<Tag>> {
    let select = crate::entity::tag::Entity::find();
    let page = fetch_page(db, select, crate::entity::tag::Column::Id, request).await?;
    Ok(page.map(model_to_tag))
}

/// Delete a tag and detach it from every novel.
pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    let txn = db.begin().await?;

    crate::entity::novel_tag::Entity::delete_many()
        .filter(crate::entity::novel_tag::Column::TagId.eq(id))
        .exec(&txn)
        .await?;
    let result = crate::entity::tag::Entity::delete_by_id(id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result.rows_affected > 0)
}

fn model_to_tag(m: crate::entity::tag::Model) -> Tag {
    Tag {
        id: m.id,
        name: m.name,
        slug: m.slug,
        created_at: m.created_at,
    }
}
