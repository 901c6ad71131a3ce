//! State-machine orchestration: accept-delivery, return-to-courier,
//! issue-to-client, accept-customer-return, list-orders, list-returns.
//!
//! `OrderUseCase` is the only caller of [`TxManager::run`] — every operation
//! here opens at most one transaction and wraps the order mutation together
//! with its outbox event, per the transaction-discipline rule. Reads that
//! back a cache miss run against the pool directly; internal "load and
//! validate" reads used by the mutating operations also go straight to the
//! store, since they need the freshest row, not a TTL-stale one.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pvz_common::{OrderId, PvzError, PvzId, PvzResult, RecipientId};

use crate::cache::OrderCache;
use crate::domain::{Event, EventPayload, Order, Packaging};
use crate::metrics::{global_metrics, Metrics};
use crate::packager;
use crate::store::order_store::{self, GetOrdersOptions, GetReturnsOptions};
use crate::store::event_store;
use crate::tx::{IsolationLevel, TxManager};

/// Orchestrates the order lifecycle for a single PVZ.
pub struct OrderUseCase {
    current_pvz: PvzId,
    tx: Arc<TxManager>,
    cache: Arc<OrderCache>,
    metrics: Arc<dyn Metrics>,
}

impl OrderUseCase {
    /// Construct a use-case bound to `current_pvz`, using the process-wide
    /// metrics sink.
    #[must_use]
    pub fn new(current_pvz: PvzId, tx: Arc<TxManager>, cache: Arc<OrderCache>) -> Self {
        Self {
            current_pvz,
            tx,
            cache,
            metrics: global_metrics(),
        }
    }

    /// Construct a use-case with an injected metrics sink, for tests.
    #[must_use]
    pub fn with_metrics(
        current_pvz: PvzId,
        tx: Arc<TxManager>,
        cache: Arc<OrderCache>,
        metrics: Arc<dyn Metrics>,
    ) -> Self {
        Self {
            current_pvz,
            tx,
            cache,
            metrics,
        }
    }

    /// Accept a parcel for storage.
    #[allow(clippy::too_many_arguments)]
    pub async fn accept_order_delivery(
        &self,
        order_id: OrderId,
        recipient_id: RecipientId,
        storage_time: Duration,
        cost: i64,
        weight: i64,
        packaging: Packaging,
        additional_film: bool,
    ) -> PvzResult<Order> {
        if order_store::get_order(self.tx.pool(), &order_id).await.is_ok() {
            return Err(PvzError::already_exists(format!("order {order_id}")));
        }

        if additional_film && packaging == Packaging::Film {
            return Err(PvzError::invalid_argument(
                "additional film cannot be combined with film packaging",
            ));
        }

        let now = Utc::now();
        let bare = Order {
            id: order_id.clone(),
            pvz_id: self.current_pvz.clone(),
            recipient_id: recipient_id.clone(),
            cost,
            weight,
            packaging: Packaging::Unknown,
            additional_film,
            received_at: now,
            storage_time,
            issued_at: None,
            returned_at: None,
            deleted_at: None,
        };
        let order = packager::package_order_with_additional_film(bare, packaging, additional_film)?;

        let event = Event::new(EventPayload::OrderDeliveryAccepted {
            order_id: order.id.clone(),
            pvz_id: order.pvz_id.clone(),
            recipient_id: order.recipient_id.clone(),
            cost: order.cost,
            weight: order.weight,
            packaging: order.packaging.to_string(),
            additional_film: order.additional_film,
            received_at: order.received_at,
            storage_time_secs: order.storage_time.num_seconds(),
        });

        let order_for_store = order.clone();
        self.tx
            .run(IsolationLevel::ReadCommitted, move |mut transaction| {
                let order = order_for_store.clone();
                let event = event.clone();
                async move {
                    order_store::create_order(&mut *transaction, &order).await?;
                    event_store::create(&mut *transaction, &event).await?;
                    Ok((transaction, ()))
                }
            })
            .await?;

        Ok(order)
    }

    /// Courier-pickup path for a parcel whose storage expired before it was
    /// issued.
    pub async fn return_order_delivery(&self, order_id: OrderId, now: DateTime<Utc>) -> PvzResult<()> {
        let order = order_store::get_order(self.tx.pool(), &order_id).await?;

        if order.pvz_id != self.current_pvz {
            return Err(PvzError::invalid_argument("order belongs to a different pvz"));
        }
        if !order.storage_expired(now) {
            return Err(PvzError::invalid_argument("storage has not expired"));
        }
        if order.issued_at.is_some() {
            return Err(PvzError::invalid_argument("order was already issued"));
        }

        let event = Event::new(EventPayload::OrderDeliveryReturned {
            order_id: order.id.clone(),
        });

        self.tx
            .run(IsolationLevel::ReadCommitted, move |mut transaction| {
                let order_id = order.id.clone();
                let event = event.clone();
                async move {
                    order_store::delete_order(&mut *transaction, &order_id).await?;
                    event_store::create(&mut *transaction, &event).await?;
                    Ok((transaction, ()))
                }
            })
            .await
    }

    /// Hand a batch of parcels to their recipient. Non-atomic across the
    /// list by design: a mid-sequence failure leaves earlier orders issued.
    pub async fn give_order_to_client(&self, order_ids: Vec<OrderId>, now: DateTime<Utc>) -> PvzResult<()> {
        if order_ids.is_empty() {
            return Err(PvzError::invalid_argument("order list must not be empty"));
        }

        let mut orders = Vec::with_capacity(order_ids.len());
        for id in &order_ids {
            let order = order_store::get_order(self.tx.pool(), id).await?;
            if order.pvz_id != self.current_pvz {
                return Err(PvzError::invalid_argument(format!(
                    "order {id} belongs to a different pvz"
                )));
            }
            if order.issued_at.is_some() {
                return Err(PvzError::invalid_argument(format!(
                    "order {id} was already issued"
                )));
            }
            if order.storage_expired(now) {
                return Err(PvzError::invalid_argument(format!(
                    "order {id} storage has expired"
                )));
            }
            orders.push(order);
        }

        let recipient = &orders[0].recipient_id;
        if orders.iter().any(|o| &o.recipient_id != recipient) {
            return Err(PvzError::invalid_argument(
                "all orders in a give-to-client batch must share a recipient",
            ));
        }

        for order in orders {
            let event = Event::new(EventPayload::OrderIssued {
                order_id: order.id.clone(),
            });
            let order_id = order.id.clone();
            self.tx
                .run(IsolationLevel::ReadCommitted, move |mut transaction| {
                    let order_id = order_id.clone();
                    let event = event.clone();
                    async move {
                        order_store::set_order_issued(&mut *transaction, &order_id).await?;
                        event_store::create(&mut *transaction, &event).await?;
                        Ok((transaction, ()))
                    }
                })
                .await?;
            self.metrics.inc_orders_issued(&self.current_pvz);
        }

        Ok(())
    }

    /// Accept a customer return within the return window.
    pub async fn accept_return(
        &self,
        user_id: RecipientId,
        order_id: OrderId,
        now: DateTime<Utc>,
    ) -> PvzResult<()> {
        let order = order_store::get_order(self.tx.pool(), &order_id).await?;

        if order.recipient_id != user_id {
            return Err(PvzError::invalid_argument("order belongs to a different recipient"));
        }
        if order.returned_at.is_some() {
            return Err(PvzError::invalid_argument("order was already returned"));
        }
        if order.issued_at.is_none() {
            return Err(PvzError::invalid_argument("order has not been issued"));
        }
        if !order.within_return_window(now) {
            return Err(PvzError::invalid_argument("return window has elapsed"));
        }

        let event = Event::new(EventPayload::OrderReturned {
            order_id: order.id.clone(),
        });

        self.tx
            .run(IsolationLevel::Serializable, move |mut transaction| {
                let order_id = order.id.clone();
                let event = event.clone();
                async move {
                    order_store::set_order_returned(&mut *transaction, &order_id).await?;
                    event_store::create(&mut *transaction, &event).await?;
                    Ok((transaction, ()))
                }
            })
            .await
    }

    /// Fetch a single order, cache → store → cache-fill.
    pub async fn get_order(&self, order_id: &OrderId) -> PvzResult<Order> {
        if let (Some(order), true) = self.cache.get_order(order_id) {
            return Ok(order);
        }
        let order = order_store::get_order(self.tx.pool(), order_id).await?;
        self.cache.set_order(order.clone());
        Ok(order)
    }

    /// List orders for a recipient, cache → store → cache-fill. `same_pvz`
    /// rewrites itself into `pvz_id = current_pvz` before the cache key is
    /// derived, per the component design.
    pub async fn get_orders(
        &self,
        recipient_id: RecipientId,
        mut opts: GetOrdersOptions,
        same_pvz: bool,
    ) -> PvzResult<Vec<Order>> {
        if same_pvz {
            opts.pvz_id = Some(self.current_pvz.clone());
        }

        if let (Some(orders), true) = self.cache.get_orders(&recipient_id, &opts) {
            return Ok(orders);
        }

        let orders = order_store::get_orders(self.tx.pool(), &recipient_id, &opts).await?;
        self.cache.set_orders(&recipient_id, &opts, orders.clone());
        Ok(orders)
    }

    /// List returned orders, cache → store → cache-fill.
    pub async fn get_returns(&self, opts: GetReturnsOptions) -> PvzResult<Vec<Order>> {
        if let (Some(orders), true) = self.cache.get_returns(&opts) {
            return Ok(orders);
        }
        let orders = order_store::get_returns(self.tx.pool(), &opts).await?;
        self.cache.set_returns(&opts, orders.clone());
        Ok(orders)
    }
}
