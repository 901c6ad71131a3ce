//! Constants fixed by the domain rather than by deployment configuration.
//!
//! Single source of truth for the magic numbers the specification pins
//! exactly (`ReturnWindow`, packaging surcharges and weight limits).

use chrono::Duration;

/// Interval after issuance within which a client may return a parcel (I3).
#[must_use]
pub fn return_window() -> Duration {
    Duration::hours(48)
}

/// Packaging surcharges, in minor cost units, per §4.E.
pub mod surcharge {
    /// Box packaging surcharge.
    pub const BOX: i64 = 2000;
    /// Bag packaging surcharge.
    pub const BAG: i64 = 500;
    /// Film packaging surcharge (also applied as the "additional film" layer).
    pub const FILM: i64 = 100;
}

/// Packaging weight limits in grams, per I6. `Film` is unbounded.
pub mod weight_limit {
    /// Maximum weight a `Box` may hold.
    pub const BOX: i64 = 30_000;
    /// Maximum weight a `Bag` may hold.
    pub const BAG: i64 = 10_000;
}

/// Default order-cache TTL: the cache invalidates purely by expiry (no
/// write-through invalidation), so this must stay short per §4.F.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1;

/// Default order-cache capacity before eviction kicks in.
pub const DEFAULT_CACHE_MAX_ITEMS: usize = 10_000;

/// Default outbox relay tick period, per §4.H.
pub const DEFAULT_RELAY_PERIOD_SECS: u64 = 5;

/// Default outbox relay batch size.
pub const DEFAULT_RELAY_BATCH_SIZE: i64 = 100;

/// Default bounded channel capacity for the command server's `input` line
/// channel, per §4.I.
pub const COMMAND_SERVER_INPUT_BUFFER: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_window_is_forty_eight_hours() {
        assert_eq!(return_window(), Duration::hours(48));
    }
}
