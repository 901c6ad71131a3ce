//! The outbox table: pending events, batch fetch, mark-as-sent.

use chrono::{DateTime, Utc};
use pvz_common::{PvzError, PvzResult};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::{Event, EventPayload, EventType};

fn payload_event_type(payload: &serde_json::Value) -> PvzResult<EventType> {
    payload
        .get("event_type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| PvzError::internal("stored event payload missing event_type"))?
        .parse()
}

/// Insert a new, unsent event. Runs on whatever executor the use-case
/// passes in — in practice always the transaction also holding the order
/// mutation it accompanies, so the two commit or roll back together.
pub async fn create<'c, E>(executor: E, event: &Event) -> PvzResult<()>
where
    E: PgExecutor<'c>,
{
    let payload_json = serde_json::json!({
        "event_type": event.event_type().to_string(),
        "body": event.payload,
    });
    sqlx::query(
        "INSERT INTO events (id, event_type, payload, created_at, sent_at)
         VALUES ($1, $2, $3, $4, NULL)",
    )
    .bind(event.id)
    .bind(event.event_type().to_string())
    .bind(&payload_json)
    .bind(event.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Up to `limit` unsent events, oldest first.
pub async fn get_pending_events<'c, E>(executor: E, limit: i64) -> PvzResult<Vec<Event>>
where
    E: PgExecutor<'c>,
{
    use sqlx::Row;

    let rows = sqlx::query(
        "SELECT id, payload, created_at, sent_at FROM events
         WHERE sent_at IS NULL ORDER BY created_at ASC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| -> PvzResult<Event> {
            let id: Uuid = row.try_get("id").map_err(PvzError::from)?;
            let payload_json: serde_json::Value =
                row.try_get("payload").map_err(PvzError::from)?;
            payload_event_type(&payload_json)?;
            let payload: EventPayload = serde_json::from_value(
                payload_json
                    .get("body")
                    .cloned()
                    .ok_or_else(|| PvzError::internal("stored event payload missing body"))?,
            )
            .map_err(|e| PvzError::internal(format!("failed to decode event payload: {e}")))?;
            let created_at: DateTime<Utc> = row.try_get("created_at").map_err(PvzError::from)?;
            let sent_at: Option<DateTime<Utc>> =
                row.try_get("sent_at").map_err(PvzError::from)?;
            Ok(Event {
                id,
                payload,
                created_at,
                sent_at,
            })
        })
        .collect()
}

/// Stamp `sent_at = now`. `NotFound` if the event vanished (should not
/// happen under the at-least-once contract, but the relay reports it rather
/// than silently ignoring it).
pub async fn mark_as_sent<'c, E>(executor: E, event_id: Uuid) -> PvzResult<()>
where
    E: PgExecutor<'c>,
{
    let result = sqlx::query("UPDATE events SET sent_at = now() WHERE id = $1 AND sent_at IS NULL")
        .bind(event_id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(PvzError::not_found(format!("event {event_id}")));
    }
    Ok(())
}
