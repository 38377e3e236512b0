//! Cursor based pagination shared by every list endpoint.
//!
//! A request is normalized into a [`PageRequest`], turned into a bounded query by
//! [`fetch_page`], and the fetched rows are folded into a [`Page`] carrying
//! navigation metadata.

mod cursor;
mod page;
mod query;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub use cursor::{Cursor, encode_id};
pub use page::{Page, PageInfo, PageMetadata, Paginated};
pub use query::{CursorKey, fetch_page};

/// Page size used when the client sends none or an unusable one.
pub const DEFAULT_LIMIT: u64 = 20;
/// Largest page a client may request.
pub const MAX_LIMIT: u64 = 100;

/// Pagination errors.
#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
}

/// Ordering of the identifier column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Anything other than `asc`/`desc` falls back to `desc`.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw pagination query parameters.
///
/// `limit` stays a string so an unparseable value degrades to the default
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Opaque cursor returned by a previous page
    pub cursor: Option<String>,
    /// Results per page (default 20, max 100)
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
    /// "asc" or "desc" (default "desc")
    pub sort_order: Option<String>,
}

/// Clamp a requested limit into `[1, MAX_LIMIT]`.
///
/// Missing, unparseable, zero and negative values become [`DEFAULT_LIMIT`].
pub fn normalize_limit(raw: Option<&str>) -> u64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(n) if n > 0 => (n as u64).min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// A validated pagination request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub cursor: Option<Cursor>,
    pub limit: u64,
    pub sort_order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_LIMIT,
            sort_order: SortOrder::Desc,
        }
    }
}

impl PageRequest {
    pub fn new(limit: u64, sort_order: SortOrder) -> Self {
        Self {
            cursor: None,
            limit: limit.clamp(1, MAX_LIMIT),
            sort_order,
        }
    }

    pub fn after(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Normalize raw query parameters. Fails only on a malformed cursor.
    pub fn from_query(query: &PaginationQuery) -> Result<Self, PaginationError> {
        let cursor = match query.cursor.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(Cursor::decode(raw)?),
            _ => None,
        };

        Ok(Self {
            cursor,
            limit: normalize_limit(query.limit.as_deref()),
            sort_order: SortOrder::parse_or_default(query.sort_order.as_deref()),
        })
    }

    /// Id of the supplied cursor, if it marks a real position.
    pub fn position(&self) -> Option<u64> {
        self.cursor
            .as_ref()
            .map(|c| c.id)
            .filter(|id| *id > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(cursor: Option<&str>, limit: Option<&str>, sort: Option<&str>) -> PaginationQuery {
        PaginationQuery {
            cursor: cursor.map(str::to_string),
            limit: limit.map(str::to_string),
            sort_order: sort.map(str::to_string),
        }
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(normalize_limit(Some("500")), 100);
        assert_eq!(normalize_limit(Some("100")), 100);
        assert_eq!(normalize_limit(Some("1")), 1);
        assert_eq!(normalize_limit(Some("35")), 35);
        assert_eq!(normalize_limit(Some("0")), 20);
        assert_eq!(normalize_limit(Some("-5")), 20);
        assert_eq!(normalize_limit(Some("lots")), 20);
        assert_eq!(normalize_limit(None), 20);
    }

    #[test]
    fn test_sort_order_default() {
        assert_eq!(SortOrder::parse_or_default(None), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default(Some("")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_or_default(Some("ASC")), SortOrder::Asc);
    }

    #[test]
    fn test_from_query_without_cursor() {
        let req = PageRequest::from_query(&query(None, Some("500"), Some("bogus"))).unwrap();
        assert_eq!(req.limit, 100);
        assert_eq!(req.sort_order, SortOrder::Desc);
        assert_eq!(req.cursor, None);
        assert_eq!(req.position(), None);

        let req = PageRequest::from_query(&query(Some(""), None, None)).unwrap();
        assert_eq!(req.cursor, None);
    }

    #[test]
    fn test_from_query_with_cursor() {
        let raw = encode_id(57);
        let req = PageRequest::from_query(&query(Some(&raw), Some("10"), Some("asc"))).unwrap();
        assert_eq!(req.position(), Some(57));
        assert_eq!(req.limit, 10);
        assert_eq!(req.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_from_query_rejects_garbage_cursor() {
        let err = PageRequest::from_query(&query(Some("!!garbage!!"), None, None)).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidCursor(_)));
    }

    #[test]
    fn test_zero_cursor_is_no_position() {
        let req = PageRequest::default().after(Cursor::new(0));
        assert_eq!(req.position(), None);
    }
}
