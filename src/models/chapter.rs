//! Chapter models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Chapter {
    pub id: i32,
    pub novel_id: i32,
    pub number: i32,
    pub title: String,
    pub content: String,
    pub word_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chapter without its body, as returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChapterSummary {
    pub id: i32,
    pub novel_id: i32,
    pub number: i32,
    pub title: String,
    pub word_count: i32,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Chapter> for ChapterSummary {
    fn from(c: Chapter) -> Self {
        Self {
            id: c.id,
            novel_id: c.novel_id,
            number: c.number,
            title: c.title,
            word_count: c.word_count,
            published_at: c.published_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChapterRequest {
    /// Defaults to one past the highest existing number.
    #[serde(default)]
    pub number: Option<i32>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateChapterRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}
