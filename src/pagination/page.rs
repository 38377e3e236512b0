//! Page assembly from an oversized fetch.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::query::CursorKey;
use super::{PageRequest, SortOrder, encode_id};

/// Navigation metadata derived from one fetch. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
}

/// One page of rows plus its navigation metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
    pub limit: u64,
    pub sort_order: SortOrder,
}

impl<T: CursorKey> Page<T> {
    /// Build a page from rows fetched with `limit + 1`.
    ///
    /// The extra row only signals that another page exists and is dropped.
    /// `has_previous_page` reflects whether a positioned cursor was supplied;
    /// it is not verified against the table.
    pub fn from_rows(mut rows: Vec<T>, request: &PageRequest) -> Self {
        let limit = request.limit as usize;
        let has_next_page = rows.len() > limit;
        if has_next_page {
            rows.truncate(limit);
        }
        let has_previous_page = request.position().is_some();

        let start_cursor = rows.first().map(|row| encode_id(row.cursor_id()));
        let end_cursor = rows.last().map(|row| encode_id(row.cursor_id()));

        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            next_cursor: if has_next_page { end_cursor.clone() } else { None },
            previous_cursor: if has_previous_page {
                start_cursor.clone()
            } else {
                None
            },
            start_cursor,
            end_cursor,
        };

        Self {
            items: rows,
            page_info,
            limit: request.limit,
            sort_order: request.sort_order,
        }
    }
}

impl<T> Page<T> {
    /// Convert the rows while keeping the navigation metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_info: self.page_info,
            limit: self.limit,
            sort_order: self.sort_order,
        }
    }

    /// Wrap into the wire envelope.
    pub fn into_response(self) -> Paginated<T> {
        Paginated {
            metadata: PageMetadata {
                count: self.items.len(),
                limit: self.limit,
                sort_order: self.sort_order,
            },
            data: self.items,
            page_info: self.page_info,
        }
    }
}

/// Summary of the returned page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageMetadata {
    pub count: usize,
    pub limit: u64,
    pub sort_order: SortOrder,
}

/// Response envelope for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page_info: PageInfo,
    pub metadata: PageMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Cursor;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(u64);

    impl CursorKey for Row {
        fn cursor_id(&self) -> u64 {
            self.0
        }
    }

    fn rows(ids: impl IntoIterator<Item = u64>) -> Vec<Row> {
        ids.into_iter().map(Row).collect()
    }

    #[test]
    fn test_exact_page_has_no_next() {
        let request = PageRequest::new(20, SortOrder::Asc);
        let page = Page::from_rows(rows(1..=20), &request);

        assert_eq!(page.items.len(), 20);
        assert!(!page.page_info.has_next_page);
        assert_eq!(page.page_info.next_cursor, None);
        assert_eq!(page.page_info.start_cursor, Some(encode_id(1)));
        assert_eq!(page.page_info.end_cursor, Some(encode_id(20)));
    }

    #[test]
    fn test_overflow_page_drops_peek_row() {
        let request = PageRequest::new(20, SortOrder::Asc);
        let page = Page::from_rows(rows(1..=21), &request);

        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items.last(), Some(&Row(20)));
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.next_cursor, Some(encode_id(20)));
        assert_eq!(page.page_info.next_cursor, page.page_info.end_cursor);
    }

    #[test]
    fn test_descending_overflow() {
        let request = PageRequest::new(3, SortOrder::Desc);
        let page = Page::from_rows(rows([10, 9, 8, 7]), &request);

        assert_eq!(page.items, rows([10, 9, 8]));
        assert_eq!(page.page_info.start_cursor, Some(encode_id(10)));
        assert_eq!(page.page_info.next_cursor, Some(encode_id(8)));
    }

    #[test]
    fn test_empty_result() {
        let request = PageRequest::default().after(Cursor::new(99));
        let page: Page<Row> = Page::from_rows(Vec::new(), &request);

        assert!(page.items.is_empty());
        assert!(!page.page_info.has_next_page);
        assert_eq!(page.page_info.next_cursor, None);
        assert_eq!(page.page_info.previous_cursor, None);
        assert_eq!(page.page_info.start_cursor, None);
        assert_eq!(page.page_info.end_cursor, None);
    }

    #[test]
    fn test_previous_page_follows_cursor() {
        let first = Page::from_rows(rows(1..=5), &PageRequest::new(5, SortOrder::Asc));
        assert!(!first.page_info.has_previous_page);
        assert_eq!(first.page_info.previous_cursor, None);

        let request = PageRequest::new(5, SortOrder::Asc).after(Cursor::new(5));
        let second = Page::from_rows(rows(6..=8), &request);
        assert!(second.page_info.has_previous_page);
        assert_eq!(second.page_info.previous_cursor, Some(encode_id(6)));
    }

    #[test]
    fn test_envelope_metadata() {
        let request = PageRequest::new(2, SortOrder::Desc);
        let envelope = Page::from_rows(rows([3, 2, 1]), &request)
            .map(|row| row.0 * 10)
            .into_response();

        assert_eq!(envelope.data, vec![30, 20]);
        assert_eq!(envelope.metadata.count, 2);
        assert_eq!(envelope.metadata.limit, 2);

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["metadata"]["sort_order"], "desc");
        assert_eq!(json["page_info"]["has_next_page"], true);
        assert!(json["page_info"].get("previous_cursor").is_none());
    }
}
