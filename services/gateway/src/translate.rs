//! Field-level translation between wire types (`pb`, and the HTTP/JSON
//! request/response shapes) and the use-case's domain types.

use chrono::{DateTime, TimeZone, Utc};
use oms::domain::{Order, Packaging};
use pvz_common::PvzError;

use crate::pb;

fn unix_secs(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}

fn from_unix_secs(secs: i64) -> Result<DateTime<Utc>, PvzError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| PvzError::invalid_argument(format!("invalid unix timestamp: {secs}")))
}

impl From<Packaging> for pb::Packaging {
    fn from(value: Packaging) -> Self {
        match value {
            Packaging::Box => Self::Box,
            Packaging::Bag => Self::Bag,
            Packaging::Film => Self::Film,
            Packaging::Unknown => Self::Unspecified,
        }
    }
}

impl TryFrom<pb::Packaging> for Packaging {
    type Error = PvzError;

    fn try_from(value: pb::Packaging) -> Result<Self, Self::Error> {
        match value {
            pb::Packaging::Box => Ok(Self::Box),
            pb::Packaging::Bag => Ok(Self::Bag),
            pb::Packaging::Film => Ok(Self::Film),
            pb::Packaging::Unspecified => Err(PvzError::invalid_argument(
                "packaging must be specified",
            )),
        }
    }
}

/// Translate a domain [`Order`] into its wire representation.
pub fn order_to_pb(order: &Order) -> pb::Order {
    pb::Order {
        order_id: order.id.to_string(),
        pvz_id: order.pvz_id.to_string(),
        recipient_id: order.recipient_id.to_string(),
        cost: order.cost,
        weight: order.weight,
        packaging: pb::Packaging::from(order.packaging) as i32,
        additional_film: order.additional_film,
        received_at_unix: unix_secs(order.received_at),
        storage_time_secs: order.storage_time.num_seconds(),
        issued_at_unix: order.issued_at.map(unix_secs),
        returned_at_unix: order.returned_at.map(unix_secs),
        deleted_at_unix: order.deleted_at.map(unix_secs),
    }
}

/// Parse a wire-level unix timestamp the use-case needs as a `DateTime`,
/// used for the `now` parameter of operations that compare against it (the
/// gateway always passes the real current time; this exists for the HTTP
/// mirror's JSON encoding, which has no native timestamp type).
pub fn now_from_request_or_wall_clock(unix_secs_opt: Option<i64>) -> Result<DateTime<Utc>, PvzError> {
    match unix_secs_opt {
        Some(secs) => from_unix_secs(secs),
        None => Ok(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaging_round_trips() {
        for kind in [Packaging::Box, Packaging::Bag, Packaging::Film] {
            let wire = pb::Packaging::from(kind);
            assert_eq!(Packaging::try_from(wire).unwrap(), kind);
        }
    }

    #[test]
    fn unspecified_packaging_is_invalid_argument() {
        assert!(Packaging::try_from(pb::Packaging::Unspecified).is_err());
    }
}
