//! Transaction manager.
//!
//! Go's `context.Context` lets a transaction handle ride along implicitly
//! through arbitrarily deep call chains; Rust has no equivalent ambient
//! slot, so the handle is threaded explicitly. [`TxManager::run`] is the
//! only place a transaction is opened — stores receive a `&mut PgConnection`
//! and never call `BEGIN`/`COMMIT` themselves, which is what keeps the "one
//! transaction per use-case operation" discipline mechanical rather than
//! conventional.

use pvz_common::{PvzError, PvzResult};
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;

/// Isolation level a use-case operation opens its transaction at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// Default for most operations.
    ReadCommitted,
    /// Unused by the current use-case methods but exposed for completeness.
    RepeatableRead,
    /// Required by `SetOrderReturned`: concurrent customer returns of the
    /// same order must serialize.
    Serializable,
}

impl IsolationLevel {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// Opens transactions at a selectable isolation level.
///
/// There is deliberately no `GetQueryEngine`-equivalent method: in the Go
/// original that call inspects ambient context to decide "are we already in
/// a transaction"; here the caller always has the connection handle in hand
/// (either the pool, or the `&mut PgConnection` passed down from `run`), so
/// the question never needs asking.
pub struct TxManager {
    pool: PgPool,
}

impl TxManager {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Borrow the underlying pool for read-only operations that do not need
    /// transactional semantics (e.g. cache-miss reads in `GetOrders`).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `body` inside a transaction opened at `isolation`. Commits on
    /// `Ok`, rolls back on `Err`. `body` receives the transaction by
    /// mutable reference (via `Transaction`'s `Deref<Target = PgConnection>`)
    /// so repositories can `&mut *tx` down into `sqlx::query(...).execute(&mut *conn)`.
    pub async fn run<'a, F, Fut, T>(&'a self, isolation: IsolationLevel, body: F) -> PvzResult<T>
    where
        F: FnOnce(Transaction<'a, Postgres>) -> Fut,
        Fut: Future<Output = PvzResult<(Transaction<'a, Postgres>, T)>>,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PvzError::internal(format!("failed to open transaction: {e}")))?;

        sqlx::query(&format!(
            "SET TRANSACTION ISOLATION LEVEL {}",
            isolation.as_sql()
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| PvzError::internal(format!("failed to set isolation level: {e}")))?;

        let (tx, value) = body(tx).await?;

        tx.commit()
            .await
            .map_err(|e| PvzError::internal(format!("failed to commit transaction: {e}")))?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolation_levels_render_expected_sql() {
        assert_eq!(IsolationLevel::ReadCommitted.as_sql(), "READ COMMITTED");
        assert_eq!(IsolationLevel::RepeatableRead.as_sql(), "REPEATABLE READ");
        assert_eq!(IsolationLevel::Serializable.as_sql(), "SERIALIZABLE");
    }
}
