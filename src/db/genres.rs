//! Database operations for genres.

use chrono::Utc;
use sea_orm::*;

use crate::error::AppResult;
use crate::models::Genre;
use crate::pagination::{Page, PageRequest, fetch_page};

pub async fn insert(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
    description: Option<&str>,
) -> AppResult<Genre> {
    let model = crate::entity::genre::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        description: Set(description.map(|s| s.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_genre(inserted))
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Option<Genre>> {
    let result = crate::entity::genre::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_genre))
}

/// Fetch the genres with the given ids, ordered by id. Unknown ids are skipped.
pub async fn find_by_ids<C: ConnectionTrait>(db: &C, ids: &[i32]) -> AppResult<Vec<Genre>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let results = crate::entity::genre::Entity::find()
        .filter(crate::entity::genre::Column::Id.is_in(ids.to_vec()))
        .order_by_asc(crate::entity::genre::Column::Id)
        .all(db)
        .await?;

    Ok(results.into_iter().map(model_to_genre).collect())
}

pub async fn list(db: &DatabaseConnection, request: &PageRequest) -> AppResult<Page<Genre>> {
    let select = crate::entity::genre::Entity::find();
    let page = fetch_page(db, select, crate::entity::genre::Column::Id, request).await?;
    Ok(page.map(model_to_genre))
}

/// Delete a genre and detach it from every novel.
pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    let txn = db.begin().await?;

    crate::entity::novel_genre::Entity::delete_many()
        .filter(crate::entity::novel_genre::Column::GenreId.eq(id))
        .exec(&txn)
        .await?;
    let result = crate::entity::genre::Entity::delete_by_id(id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result.rows_affected > 0)
}

fn model_to_genre(m: crate::entity::genre::Model) -> Genre {
    Genre {
        id: m.id,
        name: m.name,
        slug: m.slug,
        description: m.description,
        created_at: m.created_at,
    }
}
