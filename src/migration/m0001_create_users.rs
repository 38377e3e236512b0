//! Migration: Create users table.

use sea_orm_migration::{prelude::*, schema::*};

use super::Migration;

pub struct CreateUsers;

#[async_trait::async_trait]
impl Migration for CreateUsers {
    fn id(&self) -> &'static str {
        "m0001_create_users"
    }

    fn description(&self) -> &'static str {
        "Create users table"
    }

    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .col(pk_auto(Users::Id))
                    .col(string_uniq(Users::Username))
                    .col(string_uniq(Users::Email))
                    .col(string_null(Users::DisplayName))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Users::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    DisplayName,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
