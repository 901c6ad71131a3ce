//! Transactional CRUD over `pvz_orders`, plus cursor/offset pagination.
//!
//! Every function is generic over `sqlx::PgExecutor` so the same code runs
//! against a pooled connection for plain reads and against the `&mut
//! PgConnection` handed down by [`crate::tx::TxManager::run`] for writes
//! that must join the calling use-case's transaction — the store itself
//! never opens one.

use chrono::{DateTime, Utc};
use pvz_common::{OrderId, PvzError, PvzId, PvzResult, RecipientId};
use sqlx::PgExecutor;

use crate::domain::{Order, Packaging};

/// Options accepted by [`get_orders`]. A plain option record rather than a
/// callable-chain builder, per the canonical design's Options builders note.
#[derive(Debug, Clone, Default)]
pub struct GetOrdersOptions {
    /// Restrict to the current PVZ. Rewritten into `pvz_id` by the use-case
    /// before the cache key is derived, so the store only ever sees the
    /// resolved id.
    pub pvz_id: Option<PvzId>,
    /// Truncate to the newest N matching orders.
    pub last_n: Option<u32>,
    /// Start the page at this order id's position in the sorted sequence
    /// (inclusive). Empty/unknown cursors behave as "start from the top".
    pub cursor: Option<OrderId>,
    /// Hard cap on rows returned.
    pub limit: Option<u32>,
}

/// Options accepted by [`get_returns`]: plain offset pagination.
#[derive(Debug, Clone, Copy)]
pub struct GetReturnsOptions {
    /// Zero-based page index.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
}

impl Default for GetReturnsOptions {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 20,
        }
    }
}

struct OrderRow {
    id: String,
    pvz_id: String,
    recipient_id: String,
    cost: i64,
    weight: i64,
    packaging: String,
    additional_film: bool,
    received_at: DateTime<Utc>,
    storage_time_secs: i64,
    issued_at: Option<DateTime<Utc>>,
    returned_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = PvzError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::from(row.id),
            pvz_id: PvzId::from(row.pvz_id),
            recipient_id: RecipientId::from(row.recipient_id),
            cost: row.cost,
            weight: row.weight,
            packaging: row.packaging.parse::<Packaging>()?,
            additional_film: row.additional_film,
            received_at: row.received_at,
            storage_time: chrono::Duration::seconds(row.storage_time_secs),
            issued_at: row.issued_at,
            returned_at: row.returned_at,
            deleted_at: row.deleted_at,
        })
    }
}

fn row_from_sqlx(row: &sqlx::postgres::PgRow) -> Result<OrderRow, sqlx::Error> {
    use sqlx::Row;
    Ok(OrderRow {
        id: row.try_get("id")?,
        pvz_id: row.try_get("pvz_id")?,
        recipient_id: row.try_get("recipient_id")?,
        cost: row.try_get("cost")?,
        weight: row.try_get("weight")?,
        packaging: row.try_get("packaging")?,
        additional_film: row.try_get("additional_film")?,
        received_at: row.try_get("received_at")?,
        storage_time_secs: row.try_get("storage_time_secs")?,
        issued_at: row.try_get("issued_at")?,
        returned_at: row.try_get("returned_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

/// Insert a new order. Fails [`PvzError::AlreadyExists`] on id collision.
pub async fn create_order<'c, E>(executor: E, order: &Order) -> PvzResult<()>
where
    E: PgExecutor<'c>,
{
    sqlx::query(
        "INSERT INTO pvz_orders
            (id, pvz_id, recipient_id, cost, weight, packaging, additional_film,
             received_at, storage_time_secs, issued_at, returned_at, deleted_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(order.id.as_str())
    .bind(order.pvz_id.as_str())
    .bind(order.recipient_id.as_str())
    .bind(order.cost)
    .bind(order.weight)
    .bind(order.packaging.to_string())
    .bind(order.additional_film)
    .bind(order.received_at)
    .bind(order.storage_time.num_seconds())
    .bind(order.issued_at)
    .bind(order.returned_at)
    .bind(order.deleted_at)
    .execute(executor)
    .await
    .map_err(PvzError::from)?;
    Ok(())
}

/// Set `deleted_at = now` (courier-return path).
pub async fn delete_order<'c, E>(executor: E, order_id: &OrderId) -> PvzResult<()>
where
    E: PgExecutor<'c>,
{
    let result = sqlx::query(
        "UPDATE pvz_orders SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(order_id.as_str())
    .execute(executor)
    .await?;
    if result.rows_affected() == 0 {
        return Err(PvzError::not_found(format!("order {order_id}")));
    }
    Ok(())
}

/// Set `issued_at = now`.
pub async fn set_order_issued<'c, E>(executor: E, order_id: &OrderId) -> PvzResult<()>
where
    E: PgExecutor<'c>,
{
    let result =
        sqlx::query("UPDATE pvz_orders SET issued_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(order_id.as_str())
            .execute(executor)
            .await?;
    if result.rows_affected() == 0 {
        return Err(PvzError::not_found(format!("order {order_id}")));
    }
    Ok(())
}

/// Set `returned_at = now`.
pub async fn set_order_returned<'c, E>(executor: E, order_id: &OrderId) -> PvzResult<()>
where
    E: PgExecutor<'c>,
{
    let result = sqlx::query(
        "UPDATE pvz_orders SET returned_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(order_id.as_str())
    .execute(executor)
    .await?;
    if result.rows_affected() == 0 {
        return Err(PvzError::not_found(format!("order {order_id}")));
    }
    Ok(())
}

/// Load a live (not deleted) order by id.
pub async fn get_order<'c, E>(executor: E, order_id: &OrderId) -> PvzResult<Order>
where
    E: PgExecutor<'c>,
{
    let row = sqlx::query("SELECT * FROM pvz_orders WHERE id = $1 AND deleted_at IS NULL")
        .bind(order_id.as_str())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| PvzError::not_found(format!("order {order_id}")))?;
    Order::try_from(row_from_sqlx(&row)?)
}

/// Orders addressed to `recipient_id`, live, newest-received first, per the
/// filter/truncation/cursor/limit rules in the cursor-semantics note.
pub async fn get_orders<'c, E>(
    executor: E,
    recipient_id: &RecipientId,
    opts: &GetOrdersOptions,
) -> PvzResult<Vec<Order>>
where
    E: PgExecutor<'c>,
{
    let mut sql = String::from(
        "SELECT * FROM pvz_orders WHERE recipient_id = $1 AND deleted_at IS NULL",
    );
    let mut bind_pvz = false;
    if opts.pvz_id.is_some() {
        sql.push_str(" AND pvz_id = $2");
        bind_pvz = true;
    }
    sql.push_str(" ORDER BY received_at DESC, id DESC");

    let mut query = sqlx::query(&sql).bind(recipient_id.as_str());
    if bind_pvz {
        query = query.bind(opts.pvz_id.as_ref().unwrap().as_str());
    }

    let rows = query.fetch_all(executor).await?;
    let mut orders = rows
        .iter()
        .map(|r| Order::try_from(row_from_sqlx(r)?))
        .collect::<Result<Vec<_>, _>>()?;

    // Cursor: start at the row whose id matches the cursor, or from the top
    // if absent/unknown (never fail on an unknown cursor).
    if let Some(cursor) = &opts.cursor {
        if !cursor.as_str().is_empty() {
            if let Some(pos) = orders.iter().position(|o| &o.id == cursor) {
                orders.drain(..pos);
            }
        }
    }

    if let Some(last_n) = opts.last_n {
        orders.truncate(last_n as usize);
    }
    if let Some(limit) = opts.limit {
        orders.truncate(limit as usize);
    }

    Ok(orders)
}

/// Orders with `returned_at` set, live, newest-returned first, offset-paged.
pub async fn get_returns<'c, E>(executor: E, opts: &GetReturnsOptions) -> PvzResult<Vec<Order>>
where
    E: PgExecutor<'c>,
{
    let offset = i64::from(opts.page) * i64::from(opts.page_size);
    let rows = sqlx::query(
        "SELECT * FROM pvz_orders
         WHERE returned_at IS NOT NULL AND deleted_at IS NULL
         ORDER BY returned_at DESC, id DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(i64::from(opts.page_size))
    .bind(offset)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|r| Order::try_from(row_from_sqlx(r)?))
        .collect()
}
