//! Property tests for the quantified invariants that don't need a database:
//! P1 (timestamp monotonicity) and P6 (packaging cost additivity).

use chrono::{Duration, Utc};
use oms::domain::{Order, Packaging};
use oms::packager::{package_order, package_order_with_additional_film};
use proptest::prelude::*;
use pvz_common::{OrderId, PvzId, RecipientId};

fn arbitrary_packaging() -> impl Strategy<Value = Packaging> {
    prop_oneof![
        Just(Packaging::Box),
        Just(Packaging::Bag),
        Just(Packaging::Film),
    ]
}

fn bare_order(weight: i64, cost: i64) -> Order {
    Order {
        id: OrderId::from("ord1"),
        pvz_id: PvzId::from("p1"),
        recipient_id: RecipientId::from("u1"),
        cost,
        weight,
        packaging: Packaging::Unknown,
        additional_film: false,
        received_at: Utc::now(),
        storage_time: Duration::hours(24),
        issued_at: None,
        returned_at: None,
        deleted_at: None,
    }
}

proptest! {
    /// P6: packaging a primary kind then an additional film layer increases
    /// cost by exactly the sum of both surcharges, whenever the weight
    /// limits of both strategies are respected.
    #[test]
    fn p6_additional_film_cost_is_additive(
        cost in 0i64..100_000,
        weight in 0i64..9_000, // stays under both Box and Bag limits
        kind in arbitrary_packaging().prop_filter("additional film forbidden on film primary", |k| *k != Packaging::Film),
    ) {
        let order = bare_order(weight, cost);
        let packaged = package_order_with_additional_film(order, kind, true).unwrap();
        prop_assert_eq!(packaged.cost, cost + kind.surcharge() + Packaging::Film.surcharge());
    }

    /// P1: an order's timestamps, once derived through the normal
    /// acceptance -> issue -> return sequence, remain monotone (I1).
    #[test]
    fn p1_timestamps_stay_monotone(
        received_offset_secs in 0i64..1_000_000,
        issue_gap_secs in 0i64..100_000,
        return_gap_secs in 0i64..100_000,
    ) {
        let received_at = Utc::now() - Duration::seconds(received_offset_secs);
        let issued_at = received_at + Duration::seconds(issue_gap_secs);
        let returned_at = issued_at + Duration::seconds(return_gap_secs);

        let mut order = bare_order(100, 1000);
        order.received_at = received_at;
        order.issued_at = Some(issued_at);
        order.returned_at = Some(returned_at);

        prop_assert!(order.check_monotone_timestamps().is_ok());
    }
}

#[test]
fn box_packaging_weight_limit_is_exact() {
    let mut order = bare_order(30_000, 0);
    assert!(package_order(order.clone(), Packaging::Box).is_ok());
    order.weight = 30_001;
    assert!(package_order(order, Packaging::Box).is_err());
}
