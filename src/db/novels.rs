//! Database operations for novels and their classification.

use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::*;

use crate::error::AppResult;
use crate::models::{Genre, Novel, NovelFilter, Tag};
use crate::pagination::{Page, PageRequest, fetch_page};

/// Column values for a new novel.
#[derive(Debug, Clone)]
pub struct NewNovel {
    pub author_id: i32,
    pub title: String,
    pub slug: String,
    pub synopsis: Option<String>,
    pub status: String,
    pub cover_media_id: Option<i32>,
}

/// Column changes for an existing novel. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct NovelChanges {
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub status: Option<String>,
    pub cover_media_id: Option<i32>,
}

/// Insert a novel with its genre and tag links in one transaction.
pub async fn insert(
    db: &DatabaseConnection,
    novel: NewNovel,
    genre_ids: &[i32],
    tag_ids: &[i32],
) -> AppResult<Novel> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let model = crate::entity::novel::ActiveModel {
        author_id: Set(novel.author_id),
        title: Set(novel.title),
        slug: Set(novel.slug),
        synopsis: Set(novel.synopsis),
        status: Set(novel.status),
        cover_media_id: Set(novel.cover_media_id),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    let inserted = model.insert(&txn).await?;

    link_genres(&txn, inserted.id, genre_ids).await?;
    link_tags(&txn, inserted.id, tag_ids).await?;

    txn.commit().await?;
    Ok(model_to_novel(inserted))
}

/// Find an active novel by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Option<Novel>> {
    let result = find_active(db, id).await?;
    Ok(result.map(model_to_novel))
}

/// Whether any novel, including soft deleted ones, already uses `slug`.
pub async fn slug_exists(db: &DatabaseConnection, slug: &str) -> AppResult<bool> {
    let count = crate::entity::novel::Entity::find()
        .filter(crate::entity::novel::Column::Slug.eq(slug))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// List active novels matching every supplied filter.
pub async fn list(
    db: &DatabaseConnection,
    filter: &NovelFilter,
    request: &PageRequest,
) -> AppResult<Page<Novel>> {
    let mut select = crate::entity::novel::Entity::find()
        .filter(crate::entity::novel::Column::DeletedAt.is_null());

    if let Some(author_id) = filter.author_id {
        select = select.filter(crate::entity::novel::Column::AuthorId.eq(author_id));
    }
    if let Some(status) = &filter.status {
        select = select.filter(crate::entity::novel::Column::Status.eq(status.as_str()));
    }
    if let Some(genre_id) = filter.genre_id {
        select = select.filter(
            crate::entity::novel::Column::Id.in_subquery(
                Query::select()
                    .column(crate::entity::novel_genre::Column::NovelId)
                    .from(crate::entity::novel_genre::Entity)
                    .and_where(crate::entity::novel_genre::Column::GenreId.eq(genre_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(tag_id) = filter.tag_id {
        select = select.filter(
            crate::entity::novel::Column::Id.in_subquery(
                Query::select()
                    .column(crate::entity::novel_tag::Column::NovelId)
                    .from(crate::entity::novel_tag::Entity)
                    .and_where(crate::entity::novel_tag::Column::TagId.eq(tag_id))
                    .to_owned(),
            ),
        );
    }

    let page = fetch_page(db, select, crate::entity::novel::Column::Id, request).await?;
    Ok(page.map(model_to_novel))
}

/// Apply column changes. Returns `None` if the novel does not exist.
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    changes: NovelChanges,
) -> AppResult<Option<Novel>> {
    let Some(m) = find_active(db, id).await? else {
        return Ok(None);
    };

    let mut active: crate::entity::novel::ActiveModel = m.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(synopsis) = changes.synopsis {
        active.synopsis = Set(Some(synopsis));
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    if let Some(cover_media_id) = changes.cover_media_id {
        active.cover_media_id = Set(Some(cover_media_id));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    Ok(Some(model_to_novel(updated)))
}

/// Soft delete a novel. Returns false if the novel does not exist.
pub async fn soft_delete(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    let Some(m) = find_active(db, id).await? else {
        return Ok(false);
    };

    let mut active: crate::entity::novel::ActiveModel = m.into();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(db).await?;
    Ok(true)
}

/// Replace the novel's genres.
pub async fn set_genres(db: &DatabaseConnection, novel_id: i32, genre_ids: &[i32]) -> AppResult<()> {
    let txn = db.begin().await?;

    crate::entity::novel_genre::Entity::delete_many()
        .filter(crate::entity::novel_genre::Column::NovelId.eq(novel_id))
        .exec(&txn)
        .await?;
    link_genres(&txn, novel_id, genre_ids).await?;

    txn.commit().await?;
    Ok(())
}

/// Replace the novel's tags.
pub async fn set_tags(db: &DatabaseConnection, novel_id: i32, tag_ids: &[i32]) -> AppResult<()> {
    let txn = db.begin().await?;

    crate::entity::novel_tag::Entity::delete_many()
        .filter(crate::entity::novel_tag::Column::NovelId.eq(novel_id))
        .exec(&txn)
        .await?;
    link_tags(&txn, novel_id, tag_ids).await?;

    txn.commit().await?;
    Ok(())
}

pub async fn genres_for(db: &DatabaseConnection, novel_id: i32) -> AppResult<Vec<Genre>> {
    let ids: Vec<i32> = crate::entity::novel_genre::Entity::find()
        .filter(crate::entity::novel_genre::Column::NovelId.eq(novel_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.genre_id)
        .collect();

    super::genres::find_by_ids(db, &ids).await
}

pub async fn tags_for(db: &DatabaseConnection, novel_id: i32) -> AppResult<Vec<Tag>> {
    let ids: Vec<i32> = crate::entity::novel_tag::Entity::find()
        .filter(crate::entity::novel_tag::Column::NovelId.eq(novel_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.tag_id)
        .collect();

    super::tags::find_by_ids(db, &ids).await
}

async fn link_genres<C: ConnectionTrait>(db: &C, novel_id: i32, genre_ids: &[i32]) -> AppResult<()> {
    for genre_id in genre_ids {
        crate::entity::novel_genre::Entity::insert(crate::entity::novel_genre::ActiveModel {
            novel_id: Set(novel_id),
            genre_id: Set(*genre_id),
        })
        .exec_without_returning(db)
        .await?;
    }
    Ok(())
}

async fn link_tags<C: ConnectionTrait>(db: &C, novel_id: i32, tag_ids: &[i32]) -> AppResult<()> {
    for tag_id in tag_ids {
        crate::entity::novel_tag::Entity::insert(crate::entity::novel_tag::ActiveModel {
            novel_id: Set(novel_id),
            tag_id: Set(*tag_id),
        })
        .exec_without_returning(db)
        .await?;
    }
    Ok(())
}

async fn find_active(
    db: &DatabaseConnection,
    id: i32,
) -> AppResult<Option<crate::entity::novel::Model>> {
    let result = crate::entity::novel::Entity::find_by_id(id)
        .filter(crate::entity::novel::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    Ok(result)
}

fn model_to_novel(m: crate::entity::novel::Model) -> Novel {
    Novel {
        id: m.id,
        author_id: m.author_id,
        title: m.title,
        slug: m.slug,
        synopsis: m.synopsis,
        status: m.status,
        cover_media_id: m.cover_media_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
