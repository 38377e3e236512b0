//! Migration: Create chapters table.

use sea_orm_migration::{prelude::*, schema::*};

use super::Migration;
use super::m0006_create_novels::Novels;

pub struct CreateChapters;

#[async_trait::async_trait]
impl Migration for CreateChapters {
    fn id(&self) -> &'static str {
        "m0007_create_chapters"
    }

    fn description(&self) -> &'static str {
        "Create chapters table"
    }

    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Chapters::Table)
                    .col(pk_auto(Chapters::Id))
                    .col(integer(Chapters::NovelId))
                    .col(integer(Chapters::Number))
                    .col(string(Chapters::Title))
                    .col(text(Chapters::Content))
                    .col(integer(Chapters::WordCount).default(0))
                    .col(timestamp_with_time_zone_null(Chapters::PublishedAt))
                    .col(timestamp_with_time_zone(Chapters::CreatedAt))
                    .col(timestamp_with_time_zone(Chapters::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chapters_novel_id")
                            .from(Chapters::Table, Chapters::NovelId)
                            .to(Novels::Table, Novels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Chapter numbers are unique within a novel
        manager
            .create_index(
                Index::create()
                    .name("idx_chapters_novel_number")
                    .table(Chapters::Table)
                    .col(Chapters::NovelId)
                    .col(Chapters::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chapters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Chapters {
    Table,
    Id,
    NovelId,
    Number,
    Title,
    Content,
    WordCount,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}
