//! Migration: Create media table.
//!
//! Only metadata is stored; the bytes live under `storage_key` in object storage.

use sea_orm_migration::{prelude::*, schema::*};

use super::Migration;
use super::m0001_create_users::Users;

pub struct CreateMedia;

#[async_trait::async_trait]
impl Migration for CreateMedia {
    fn id(&self) -> &'static str {
        "m0005_create_media"
    }

    fn description(&self) -> &'static str {
        "Create media table"
    }

    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Media::Table)
                    .col(pk_auto(Media::Id))
                    .col(integer(Media::UploaderId))
                    .col(string(Media::FileName))
                    .col(string(Media::ContentType))
                    .col(big_integer(Media::SizeBytes))
                    .col(string_uniq(Media::StorageKey))
                    .col(timestamp_with_time_zone(Media::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_media_uploader_id")
                            .from(Media::Table, Media::UploaderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_media_uploader_id")
                    .table(Media::Table)
                    .col(Media::UploaderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Media::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Media {
    Table,
    Id,
    UploaderId,
    FileName,
    ContentType,
    SizeBytes,
    StorageKey,
    CreatedAt,
}
