//! Migration: Create novels and their genre/tag join tables.

use sea_orm_migration::{prelude::*, schema::*};

use super::Migration;
use super::m0001_create_users::Users;
use super::m0004_create_genres_and_tags::{Genres, Tags};
use super::m0005_create_media::Media;

pub struct CreateNovels;

#[async_trait::async_trait]
impl Migration for CreateNovels {
    fn id(&self) -> &'static str {
        "m0006_create_novels"
    }

    fn description(&self) -> &'static str {
        "Create novels, novel_genres and novel_tags tables"
    }

    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Novels::Table)
                    .col(pk_auto(Novels::Id))
                    .col(integer(Novels::AuthorId))
                    .col(string(Novels::Title))
                    .col(string_uniq(Novels::Slug))
                    .col(text_null(Novels::Synopsis))
                    .col(string(Novels::Status).default("draft"))
                    .col(integer_null(Novels::CoverMediaId))
                    .col(timestamp_with_time_zone(Novels::CreatedAt))
                    .col(timestamp_with_time_zone(Novels::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Novels::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_novels_author_id")
                            .from(Novels::Table, Novels::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_novels_cover_media_id")
                            .from(Novels::Table, Novels::CoverMediaId)
                            .to(Media::Table, Media::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_novels_author_id")
                    .table(Novels::Table)
                    .col(Novels::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_novels_status")
                    .table(Novels::Table)
                    .col(Novels::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NovelGenres::Table)
                    .col(integer(NovelGenres::NovelId))
                    .col(integer(NovelGenres::GenreId))
                    .primary_key(
                        Index::create()
                            .col(NovelGenres::NovelId)
                            .col(NovelGenres::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_novel_genres_novel_id")
                            .from(NovelGenres::Table, NovelGenres::NovelId)
                            .to(Novels::Table, Novels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_novel_genres_genre_id")
                            .from(NovelGenres::Table, NovelGenres::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NovelTags::Table)
                    .col(integer(NovelTags::NovelId))
                    .col(integer(NovelTags::TagId))
                    .primary_key(Index::create().col(NovelTags::NovelId).col(NovelTags::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_novel_tags_novel_id")
                            .from(NovelTags::Table, NovelTags::NovelId)
                            .to(Novels::Table, Novels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_novel_tags_tag_id")
                            .from(NovelTags::Table, NovelTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NovelTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NovelGenres::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Novels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Novels {
    Table,
    Id,
    AuthorId,
    Title,
    Slug,
    Synopsis,
    Status,
    CoverMediaId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
pub enum NovelGenres {
    Table,
    NovelId,
    GenreId,
}

#[derive(DeriveIden)]
pub enum NovelTags {
    Table,
    NovelId,
    TagId,
}
