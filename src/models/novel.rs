//! Novel domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::taxonomy::{Genre, Tag};

/// Publication state of a novel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NovelStatus {
    #[default]
    Draft,
    Ongoing,
    Completed,
    Hiatus,
}

impl NovelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Hiatus => "hiatus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "ongoing" => Some(Self::Ongoing),
            "completed" => Some(Self::Completed),
            "hiatus" => Some(Self::Hiatus),
            _ => None,
        }
    }
}

impl std::fmt::Display for NovelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Novel {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub slug: String,
    pub synopsis: Option<String>,
    pub status: String,
    pub cover_media_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Novel with its classification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NovelDetail {
    pub novel: Novel,
    pub genres: Vec<Genre>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNovelRequest {
    pub title: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    /// One of draft, ongoing, completed, hiatus (default: draft)
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cover_media_id: Option<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
    /// Author to publish as. Only callers allowed to manage novels may set it.
    #[serde(default)]
    pub author_id: Option<i32>,
}

/// Partial novel update. The slug is fixed at creation.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateNovelRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cover_media_id: Option<i32>,
}

/// Replaces the full set of genre or tag ids on a novel.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetIdsRequest {
    pub ids: Vec<i32>,
}

/// Optional list filters, combined with AND.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NovelFilter {
    pub author_id: Option<i32>,
    pub status: Option<String>,
    pub genre_id: Option<i32>,
    pub tag_id: Option<i32>,
}
