//! TTL + capacity-bounded order cache with pluggable eviction.
//!
//! Grounded on the original's generic `Cache[K, V]`
//! (`inmemmory.go`): one mutex guards the whole map, `Get` evicts before
//! looking up if the map is over capacity, and eviction is one of two
//! strategies sorting by last-access or hit count. The original injects an
//! `InvalidationStrategy` interface at construction; `EvictionPolicy` here is
//! a closed two-variant enum instead, since Rust has no open set of
//! eviction strategies to support and a `match` is simpler than a trait
//! object for two cases.
//!
//! Writes never invalidate: correctness relies entirely on TTL expiry, which
//! is why the default TTL is one second (see `pvz_common::constants`).

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::hash::{Hash, Hasher};

use crate::domain::Order;
use crate::store::order_store::{GetOrdersOptions, GetReturnsOptions};
use pvz_common::{OrderId, RecipientId};

/// Eviction strategy applied when the cache exceeds `max_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Removes the entries with the oldest last-access time first.
    Lru,
    /// Removes the entries with the lowest hit count first.
    Lfu,
}

struct Entry<V> {
    value: V,
    created_at: DateTime<Utc>,
    last_access: DateTime<Utc>,
    hits: u64,
}

/// A TTL- and capacity-bounded map, generic over its stored value type.
pub struct Cache<V> {
    entries: Mutex<FxHashMap<String, Entry<V>>>,
    ttl: chrono::Duration,
    max_items: usize,
    policy: EvictionPolicy,
}

impl<V: Clone> Cache<V> {
    /// Construct a cache with the given TTL, capacity, and eviction policy.
    #[must_use]
    pub fn new(ttl: chrono::Duration, max_items: usize, policy: EvictionPolicy) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            ttl,
            max_items,
            policy,
        }
    }

    /// Unconditional insert or replace.
    pub fn set(&self, key: String, value: V) {
        let now = Utc::now();
        self.entries.lock().insert(
            key,
            Entry {
                value,
                created_at: now,
                last_access: now,
                hits: 0,
            },
        );
    }

    /// Look up `key`. Evicts over-capacity entries first, then expires the
    /// entry if stale, then records the hit. Returns `None` on miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();

        if entries.len() > self.max_items {
            let overflow = entries.len() - self.max_items;
            Self::evict(&mut entries, self.policy, overflow);
        }

        let now = Utc::now();
        let expired = entries
            .get(key)
            .is_some_and(|e| now - e.created_at > self.ttl);
        if expired {
            entries.remove(key);
            return None;
        }

        let entry = entries.get_mut(key)?;
        entry.last_access = now;
        entry.hits += 1;
        Some(entry.value.clone())
    }

    /// Remove `key` unconditionally.
    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Current entry count, for tests and metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache currently holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn evict(entries: &mut FxHashMap<String, Entry<V>>, policy: EvictionPolicy, count: usize) {
        if count == 0 {
            return;
        }
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        match policy {
            EvictionPolicy::Lru => {
                keys.sort_by_key(|k| entries[k].last_access);
            }
            EvictionPolicy::Lfu => {
                keys.sort_by_key(|k| entries[k].hits);
            }
        }
        for key in keys.into_iter().take(count) {
            entries.remove(&key);
        }
    }
}

/// Domain-specific value stored in the [`OrderCache`]: either a single order
/// or an order list, per the two shapes `GetOrder` vs. `GetOrders`/
/// `GetReturns` need.
#[derive(Debug, Clone)]
pub enum CachedValue {
    /// A single order, keyed `order:<order_id>`.
    Order(Order),
    /// An order list, keyed `orders:<recipient_id>:<opts-hash>` or
    /// `returns:<opts-hash>`.
    OrderList(Vec<Order>),
}

fn hash_opts<H: Hash>(opts: &H) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    opts.hash(&mut hasher);
    hasher.finish()
}

impl Hash for GetOrdersOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pvz_id.as_ref().map(pvz_common::PvzId::as_str).hash(state);
        self.last_n.hash(state);
        self.cursor.as_ref().map(OrderId::as_str).hash(state);
        self.limit.hash(state);
    }
}

impl Hash for GetReturnsOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.page.hash(state);
        self.page_size.hash(state);
    }
}

/// The order-cache specialization: three key families in front of the order
/// store, per the component design.
pub struct OrderCache {
    inner: Cache<CachedValue>,
}

impl OrderCache {
    /// Construct the order cache with the given TTL, capacity, and eviction
    /// policy.
    #[must_use]
    pub fn new(ttl: chrono::Duration, max_items: usize, policy: EvictionPolicy) -> Self {
        Self {
            inner: Cache::new(ttl, max_items, policy),
        }
    }

    fn order_key(order_id: &OrderId) -> String {
        format!("order:{order_id}")
    }

    fn orders_key(recipient_id: &RecipientId, opts: &GetOrdersOptions) -> String {
        format!("orders:{recipient_id}:{:x}", hash_opts(opts))
    }

    fn returns_key(opts: &GetReturnsOptions) -> String {
        format!("returns:{:x}", hash_opts(opts))
    }

    /// Look up a single cached order. Returns `(value, hit)`.
    #[must_use]
    pub fn get_order(&self, order_id: &OrderId) -> (Option<Order>, bool) {
        match self.inner.get(&Self::order_key(order_id)) {
            Some(CachedValue::Order(order)) => (Some(order), true),
            _ => (None, false),
        }
    }

    /// Cache a single order.
    pub fn set_order(&self, order: Order) {
        let key = Self::order_key(&order.id);
        self.inner.set(key, CachedValue::Order(order));
    }

    /// Look up a cached `GetOrders` page. Returns `(value, hit)`.
    #[must_use]
    pub fn get_orders(
        &self,
        recipient_id: &RecipientId,
        opts: &GetOrdersOptions,
    ) -> (Option<Vec<Order>>, bool) {
        match self.inner.get(&Self::orders_key(recipient_id, opts)) {
            Some(CachedValue::OrderList(orders)) => (Some(orders), true),
            _ => (None, false),
        }
    }

    /// Cache a `GetOrders` page.
    pub fn set_orders(&self, recipient_id: &RecipientId, opts: &GetOrdersOptions, orders: Vec<Order>) {
        let key = Self::orders_key(recipient_id, opts);
        self.inner.set(key, CachedValue::OrderList(orders));
    }

    /// Look up a cached `GetReturns` page. Returns `(value, hit)`.
    #[must_use]
    pub fn get_returns(&self, opts: &GetReturnsOptions) -> (Option<Vec<Order>>, bool) {
        match self.inner.get(&Self::returns_key(opts)) {
            Some(CachedValue::OrderList(orders)) => (Some(orders), true),
            _ => (None, false),
        }
    }

    /// Cache a `GetReturns` page.
    pub fn set_returns(&self, opts: &GetReturnsOptions, orders: Vec<Order>) {
        let key = Self::returns_key(opts);
        self.inner.set(key, CachedValue::OrderList(orders));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_within_ttl_hits() {
        let cache: Cache<i32> = Cache::new(chrono::Duration::seconds(60), 10, EvictionPolicy::Lru);
        cache.set("k".to_string(), 1);
        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn get_after_ttl_misses_and_evicts() {
        let cache: Cache<i32> = Cache::new(chrono::Duration::milliseconds(-1), 10, EvictionPolicy::Lru);
        cache.set("k".to_string(), 1);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn lru_evicts_oldest_access() {
        let cache: Cache<i32> = Cache::new(chrono::Duration::seconds(60), 1, EvictionPolicy::Lru);
        cache.set("first".to_string(), 1);
        cache.set("second".to_string(), 2);
        // Capacity is enforced on the next get, not on set.
        assert_eq!(cache.get("second"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn delete_removes_entry() {
        let cache: Cache<i32> = Cache::new(chrono::Duration::seconds(60), 10, EvictionPolicy::Lru);
        cache.set("k".to_string(), 1);
        cache.delete("k");
        assert_eq!(cache.get("k"), None);
    }
}
