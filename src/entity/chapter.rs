//! Chapter entity. `number` is unique within a novel.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chapters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub novel_id: i32,
    pub number: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub word_count: i32,
    pub published_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl crate::pagination::CursorKey for Model {
    fn cursor_id(&self) -> u64 {
        self.id.max(0) as u64
    }
}
