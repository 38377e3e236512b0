//! Bounded, ordered query construction over SeaORM selects.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    Select,
};

use super::{Page, PageRequest, SortOrder};
use crate::error::AppResult;

/// Anything that exposes a unique, monotonic ordering key.
pub trait CursorKey {
    fn cursor_id(&self) -> u64;
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Run `select` as one page keyed by `id_column`.
///
/// Positions past the cursor, orders by the key in the requested direction and
/// fetches `limit + 1` rows; [`Page::from_rows`] trims the extra row.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    id_column: E::Column,
    request: &PageRequest,
) -> AppResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: CursorKey + Send + Sync,
    C: ConnectionTrait,
{
    let mut select = select;

    if let Some(position) = request.position() {
        // Ids beyond i64 cannot exist in the table; clamping keeps the filter exhaustive.
        let position = i64::try_from(position).unwrap_or(i64::MAX);
        select = match request.sort_order {
            SortOrder::Asc => select.filter(id_column.gt(position)),
            SortOrder::Desc => select.filter(id_column.lt(position)),
        };
    }

    let rows = select
        .order_by(id_column, request.sort_order.into())
        .limit(request.limit + 1)
        .all(db)
        .await?;

    Ok(Page::from_rows(rows, request))
}
