//! Strategy-dispatched cost/weight validation per packaging kind.
//!
//! The original `OrderPackager` holds a `map[PackagingType]OrderPackagerStrategy`
//! because Go interfaces are wired up at construction time. `Packaging` here
//! is a closed, three-variant enum, so an exhaustive `match` is the same
//! compile-time-checked dispatch without the indirection of a strategy map
//! or trait object — the same preference the teacher crate shows for
//! `OrderType`/`OrderStatus` matches over interface maps.

use pvz_common::PvzError;

use crate::domain::{Order, Packaging};

/// Apply `kind`'s surcharge to `order.cost` and enforce `kind`'s weight
/// bound, returning a new order. Fails [`PvzError::InvalidArgument`] if the
/// order's weight exceeds the kind's limit.
pub fn package_order(order: Order, kind: Packaging) -> Result<Order, PvzError> {
    if let Some(limit) = kind.weight_limit() {
        if order.weight > limit {
            return Err(PvzError::invalid_argument(format!(
                "weight {} exceeds {kind} packaging limit of {limit}g",
                order.weight
            )));
        }
    }

    let mut order = order;
    order.cost += kind.surcharge();
    order.packaging = kind;
    Ok(order)
}

/// Apply `primary`, then apply `Film` on top if `additional_film` is
/// requested. `primary == Film` with `additional_film == true` violates I5
/// and fails eagerly, before either strategy runs.
pub fn package_order_with_additional_film(
    order: Order,
    primary: Packaging,
    additional_film: bool,
) -> Result<Order, PvzError> {
    if additional_film && primary == Packaging::Film {
        return Err(PvzError::invalid_argument(
            "additional film cannot be combined with film packaging",
        ));
    }

    let order = package_order(order, primary)?;
    if additional_film {
        package_order(order, Packaging::Film)
    } else {
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pvz_common::{OrderId, PvzId, RecipientId};

    fn bare_order(weight: i64) -> Order {
        Order {
            id: OrderId::from("ord1"),
            pvz_id: PvzId::from("p1"),
            recipient_id: RecipientId::from("u1"),
            cost: 1000,
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

    #[test]
    fn box_packaging_adds_surcharge() {
        let order = package_order(bare_order(500), Packaging::Box).unwrap();
        assert_eq!(order.cost, 3000);
        assert_eq!(order.packaging, Packaging::Box);
    }

    #[test]
    fn box_over_weight_limit_is_invalid_argument() {
        let err = package_order(bare_order(30_001), Packaging::Box).unwrap_err();
        assert_eq!(err.kind(), pvz_common::error::PvzErrorKind::InvalidArgument);
    }

    #[test]
    fn film_is_unbounded_weight() {
        assert!(package_order(bare_order(1_000_000), Packaging::Film).is_ok());
    }

    #[test]
    fn additional_film_adds_both_surcharges() {
        let order =
            package_order_with_additional_film(bare_order(100), Packaging::Box, true).unwrap();
        assert_eq!(order.cost, 1000 + 2000 + 100);
    }

    #[test]
    fn additional_film_with_film_primary_is_rejected() {
        let err =
            package_order_with_additional_film(bare_order(100), Packaging::Film, true)
                .unwrap_err();
        assert_eq!(err.kind(), pvz_common::error::PvzErrorKind::InvalidArgument);
    }
}
