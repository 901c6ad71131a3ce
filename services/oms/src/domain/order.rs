//! The `Order` entity and its derived lifecycle state.
//!
//! Fields are split the way the spec does: attributes fixed at acceptance
//! versus the three "unset until" timestamps that drive the state machine.
//! The struct itself never rejects an invariant violation — that is the
//! use-case's job, since only the use-case knows `now` and the isolation
//! level under which a transition is being attempted. What lives here is the
//! pure, no-I/O part: deriving state from timestamps and checking I1/I5/I6.

use chrono::{DateTime, Duration, Utc};
use pvz_common::{OrderId, PvzError, PvzId, RecipientId};
use serde::{Deserialize, Serialize};

use super::packaging::Packaging;

/// Order lifecycle state, derived from timestamp presence (never stored
/// directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    /// `IssuedAt`, `ReturnedAt`, `DeletedAt` all unset.
    Stored,
    /// `IssuedAt` set, `ReturnedAt`/`DeletedAt` unset.
    Issued,
    /// `IssuedAt` and `ReturnedAt` set, `DeletedAt` unset.
    ReturnedByCustomer,
    /// `DeletedAt` set (storage expired, returned to courier).
    ReturnedToCourier,
}

/// A parcel deposited at a PVZ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// The PVZ this order was accepted at. Immutable once set.
    pub pvz_id: PvzId,
    /// The recipient this parcel is addressed to. Immutable once set.
    pub recipient_id: RecipientId,
    /// Cost in minor currency units, including packaging surcharge.
    pub cost: i64,
    /// Weight in grams.
    pub weight: i64,
    /// Packaging kind applied at acceptance.
    pub packaging: Packaging,
    /// Whether a reinforcing film layer was additionally applied.
    pub additional_film: bool,
    /// When the parcel was accepted for storage.
    pub received_at: DateTime<Utc>,
    /// How long the parcel may remain collectable at the PVZ.
    pub storage_time: Duration,
    /// When the parcel was handed to its recipient. Unset while Stored.
    pub issued_at: Option<DateTime<Utc>>,
    /// When the recipient returned the parcel. Unset until a customer return.
    pub returned_at: Option<DateTime<Utc>>,
    /// When the parcel was returned to the courier as expired. Unset unless
    /// storage expired before issuance.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Derive the current lifecycle state from timestamp presence.
    #[must_use]
    pub const fn state(&self) -> OrderState {
        if self.deleted_at.is_some() {
            OrderState::ReturnedToCourier
        } else if self.returned_at.is_some() {
            OrderState::ReturnedByCustomer
        } else if self.issued_at.is_some() {
            OrderState::Issued
        } else {
            OrderState::Stored
        }
    }

    /// `true` once storage has expired relative to `now` (I2/I4 boundary).
    #[must_use]
    pub fn storage_expired(&self, now: DateTime<Utc>) -> bool {
        self.received_at + self.storage_time < now
    }

    /// `true` while a customer return is still accepted relative to `now`
    /// (I3's `ReturnWindow` boundary). Requires `issued_at` to be set;
    /// callers must check state first.
    #[must_use]
    pub fn within_return_window(&self, now: DateTime<Utc>) -> bool {
        self.issued_at
            .is_some_and(|issued| issued + pvz_common::constants::return_window() >= now)
    }

    /// Validate I1 (`received_at <= issued_at <= returned_at`) against
    /// whichever of the later timestamps are set. A violation here is a
    /// programming bug, per the spec, surfaced as `Internal` rather than a
    /// business-rule `InvalidArgument`.
    pub fn check_monotone_timestamps(&self) -> Result<(), PvzError> {
        if let Some(issued) = self.issued_at {
            if issued < self.received_at {
                return Err(PvzError::internal(
                    "issued_at precedes received_at, violating I1",
                ));
            }
            if let Some(returned) = self.returned_at {
                if returned < issued {
                    return Err(PvzError::internal(
                        "returned_at precedes issued_at, violating I1",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate I5 (`Film packaging implies no additional film layer`).
    pub fn check_film_conflict(&self) -> Result<(), PvzError> {
        if self.packaging == Packaging::Film && self.additional_film {
            return Err(PvzError::invalid_argument(
                "additional film cannot be combined with film packaging",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn stored_order() -> Order {
        Order {
            id: OrderId::from("ord1"),
            pvz_id: PvzId::from("p1"),
            recipient_id: RecipientId::from("u1"),
            cost: 3000,
            weight: 500,
            packaging: Packaging::Box,
            additional_film: false,
            received_at: Utc::now(),
            storage_time: Duration::hours(24),
            issued_at: None,
            returned_at: None,
            deleted_at: None,
        }
    }

    #[rstest]
    fn stored_order_has_stored_state(stored_order: Order) {
        assert_eq!(stored_order.state(), OrderState::Stored);
    }

    #[rstest]
    fn issuing_moves_state_to_issued(mut stored_order: Order) {
        stored_order.issued_at = Some(Utc::now());
        assert_eq!(stored_order.state(), OrderState::Issued);
    }

    #[rstest]
    fn deleting_moves_state_to_returned_to_courier(mut stored_order: Order) {
        stored_order.deleted_at = Some(Utc::now());
        assert_eq!(stored_order.state(), OrderState::ReturnedToCourier);
    }

    #[rstest]
    fn film_with_additional_film_violates_i5(mut stored_order: Order) {
        stored_order.packaging = Packaging::Film;
        stored_order.additional_film = true;
        assert!(stored_order.check_film_conflict().is_err());
    }

    #[rstest]
    fn monotone_timestamps_reject_issued_before_received(mut stored_order: Order) {
        stored_order.issued_at = Some(stored_order.received_at - Duration::seconds(1));
        assert!(stored_order.check_monotone_timestamps().is_err());
    }
}
