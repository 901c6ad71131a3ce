//! Process-wide orders-issued counter.
//!
//! The metrics registry is inherently global mutable state; the design note
//! calls for isolating it behind a single function so tests can substitute a
//! fake rather than asserting against a process-wide `static`. [`Metrics`] is
//! that substitution point: the use-case holds an `Arc<dyn Metrics>`,
//! defaulting to [`GlobalMetrics`], which is the only thing that actually
//! touches the static counter table.

use pvz_common::PvzId;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

/// Sink for the `orders_issued_total{pvz}` counter.
pub trait Metrics: Send + Sync {
    /// Increment the issued-orders counter for `pvz` by one.
    fn inc_orders_issued(&self, pvz: &PvzId);

    /// Current value of the counter for `pvz`, for assertions in tests.
    fn orders_issued(&self, pvz: &PvzId) -> u64;
}

/// The process-wide counter table, lazily initialized.
struct GlobalMetrics {
    counters: Mutex<FxHashMap<String, AtomicU64>>,
}

fn global() -> &'static GlobalMetrics {
    static INSTANCE: OnceLock<GlobalMetrics> = OnceLock::new();
    INSTANCE.get_or_init(|| GlobalMetrics {
        counters: Mutex::new(FxHashMap::default()),
    })
}

impl Metrics for GlobalMetrics {
    fn inc_orders_issued(&self, pvz: &PvzId) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(pvz.as_str().to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    fn orders_issued(&self, pvz: &PvzId) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(pvz.as_str())
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }
}

/// Handle to the process-wide metrics registry.
#[must_use]
pub fn global_metrics() -> std::sync::Arc<dyn Metrics> {
    // `global()` returns a `'static` reference; wrapping it in an `Arc` with
    // a no-op drop lets `OrderUseCase` hold the same `Arc<dyn Metrics>` type
    // regardless of whether it was given the global sink or a test double.
    struct StaticHandle(&'static GlobalMetrics);
    impl Metrics for StaticHandle {
        fn inc_orders_issued(&self, pvz: &PvzId) {
            self.0.inc_orders_issued(pvz);
        }
        fn orders_issued(&self, pvz: &PvzId) -> u64 {
            self.0.orders_issued(pvz)
        }
    }
    std::sync::Arc::new(StaticHandle(global()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeMetrics {
        issued: Mutex<FxHashMap<String, u64>>,
    }

    impl Metrics for FakeMetrics {
        fn inc_orders_issued(&self, pvz: &PvzId) {
            *self
                .issued
                .lock()
                .unwrap()
                .entry(pvz.as_str().to_string())
                .or_default() += 1;
        }

        fn orders_issued(&self, pvz: &PvzId) -> u64 {
            *self.issued.lock().unwrap().get(pvz.as_str()).unwrap_or(&0)
        }
    }

    #[test]
    fn fake_metrics_substitutes_cleanly() {
        let metrics = FakeMetrics::default();
        let pvz = PvzId::from("p1");
        metrics.inc_orders_issued(&pvz);
        metrics.inc_orders_issued(&pvz);
        assert_eq!(metrics.orders_issued(&pvz), 2);
    }
}
