//! Outbox event domain type.
//!
//! Events are append-only: the only mutation after insertion is setting
//! `sent_at`. Payloads are represented as a tagged enum rather than the
//! original's heterogeneous string-keyed map — each event type carries
//! exactly the fields documented in the bus protocol, so a consumer
//! deserializing the JSON body gets a typed shape instead of probing for
//! keys that may or may not be present.

use chrono::{DateTime, Utc};
use pvz_common::{OrderId, PvzError, PvzId, RecipientId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Closed set of event kinds emitted by the order use-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A parcel was accepted for storage.
    OrderDeliveryAccepted,
    /// A parcel was handed to its recipient.
    OrderIssued,
    /// An expired, unissued parcel was returned to the courier.
    OrderDeliveryReturned,
    /// An issued parcel was returned by its recipient within the return window.
    OrderReturned,
    /// Parse-boundary sentinel; never valid on a persisted event.
    #[doc(hidden)]
    Unknown,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::OrderDeliveryAccepted => "order_delivery_accepted",
            Self::OrderIssued => "order_issued",
            Self::OrderDeliveryReturned => "order_delivery_returned",
            Self::OrderReturned => "order_returned",
            Self::Unknown => "unknown",
        };
        write!(f, "{token}")
    }
}

impl FromStr for EventType {
    type Err = PvzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order_delivery_accepted" => Ok(Self::OrderDeliveryAccepted),
            "order_issued" => Ok(Self::OrderIssued),
            "order_delivery_returned" => Ok(Self::OrderDeliveryReturned),
            "order_returned" => Ok(Self::OrderReturned),
            other => Err(PvzError::invalid_argument(format!(
                "unknown event type: {other}"
            ))),
        }
    }
}

/// Payload carried by an [`Event`], one variant per [`EventType`].
///
/// No `serde(tag = ...)` is applied, so this serializes externally tagged —
/// `{"order_issued": {"order_id": "..."}}` — rather than as a flat
/// `event_type` key. The flat `{event_type, body}` shape the bus protocol
/// and the `events.payload` column actually use is built by hand in
/// `store::event_store::create`/`get_pending_events`, which wraps this
/// externally-tagged value alongside a separately-rendered `event_type`
/// string rather than relying on serde to produce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    /// Full acceptance record, per §6's documented payload key set.
    OrderDeliveryAccepted {
        order_id: OrderId,
        pvz_id: PvzId,
        recipient_id: RecipientId,
        cost: i64,
        weight: i64,
        packaging: String,
        additional_film: bool,
        received_at: DateTime<Utc>,
        storage_time_secs: i64,
    },
    /// Issuance record; only the order id is consumer-visible.
    OrderIssued { order_id: OrderId },
    /// Courier-return record; only the order id is consumer-visible.
    OrderDeliveryReturned { order_id: OrderId },
    /// Customer-return record; only the order id is consumer-visible.
    OrderReturned { order_id: OrderId },
}

impl EventPayload {
    /// The [`EventType`] this payload corresponds to.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::OrderDeliveryAccepted { .. } => EventType::OrderDeliveryAccepted,
            Self::OrderIssued { .. } => EventType::OrderIssued,
            Self::OrderDeliveryReturned { .. } => EventType::OrderDeliveryReturned,
            Self::OrderReturned { .. } => EventType::OrderReturned,
        }
    }
}

/// An outbox event: a domain fact, durably queued for relay to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier; also the bus partition key.
    pub id: Uuid,
    /// The event payload (and, via [`EventPayload::event_type`], its type).
    pub payload: EventPayload,
    /// When this event was appended to the outbox.
    pub created_at: DateTime<Utc>,
    /// When the relay successfully delivered this event to the bus. `None`
    /// until then; the only field ever mutated after insertion.
    pub sent_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Construct a new, unsent event stamped with the current time.
    #[must_use]
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            created_at: Utc::now(),
            sent_at: None,
        }
    }

    /// The [`EventType`] of this event, for logging and table storage.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips() {
        for t in [
            EventType::OrderDeliveryAccepted,
            EventType::OrderIssued,
            EventType::OrderDeliveryReturned,
            EventType::OrderReturned,
        ] {
            assert_eq!(t.to_string().parse::<EventType>().unwrap(), t);
        }
    }

    #[test]
    fn new_event_starts_unsent() {
        let event = Event::new(EventPayload::OrderIssued {
            order_id: OrderId::from("ord1"),
        });
        assert!(event.sent_at.is_none());
        assert_eq!(event.event_type(), EventType::OrderIssued);
    }
}
