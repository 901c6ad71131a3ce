//! Schema bootstrap, in the teacher's `run_migrations` style: idempotent
//! `CREATE TABLE IF NOT EXISTS` statements plus the indexes the component
//! design calls out, run once at startup rather than through a migration
//! framework.

use pvz_common::PvzResult;
use sqlx::PgPool;

/// Create `pvz_orders` and `events` (and their indexes) if they do not
/// already exist.
pub async fn run_migrations(pool: &PgPool) -> PvzResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS pvz_orders (
            id TEXT PRIMARY KEY,
            pvz_id TEXT NOT NULL,
            recipient_id TEXT NOT NULL,
            cost BIGINT NOT NULL,
            weight BIGINT NOT NULL,
            packaging TEXT NOT NULL,
            additional_film BOOLEAN NOT NULL,
            received_at TIMESTAMPTZ NOT NULL,
            storage_time_secs BIGINT NOT NULL,
            issued_at TIMESTAMPTZ,
            returned_at TIMESTAMPTZ,
            deleted_at TIMESTAMPTZ
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pvz_orders_recipient
         ON pvz_orders (recipient_id) WHERE deleted_at IS NULL",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pvz_orders_returned
         ON pvz_orders (returned_at DESC) WHERE returned_at IS NOT NULL AND deleted_at IS NULL",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            id UUID PRIMARY KEY,
            event_type TEXT NOT NULL,
            payload JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            sent_at TIMESTAMPTZ
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_events_pending
         ON events (created_at) WHERE sent_at IS NULL",
    )
    .execute(pool)
    .await?;

    Ok(())
}
