//! Migration: Create genres and tags tables.

use sea_orm_migration::{prelude::*, schema::*};

use super::Migration;

pub struct CreateGenresAndTags;

#[async_trait::async_trait]
impl Migration for CreateGenresAndTags {
    fn id(&self) -> &'static str {
        "m0004_create_genres_and_tags"
    }

    fn description(&self) -> &'static str {
        "Create genres and tags tables"
    }

    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .col(pk_auto(Genres::Id))
                    .col(string_uniq(Genres::Name))
                    .col(string_uniq(Genres::Slug))
                    .col(string_null(Genres::Description))
                    .col(timestamp_with_time_zone(Genres::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .col(pk_auto(Tags::Id))
                    .col(string_uniq(Tags::Name))
                    .col(string_uniq(Tags::Slug))
                    .col(timestamp_with_time_zone(Tags::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genres::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Genres {
    Table,
    Id,
    Name,
    Slug,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Tags {
    Table,
    Id,
    Name,
    Slug,
    CreatedAt,
}
