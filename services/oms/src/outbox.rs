//! Outbox relay: periodically drains pending events and ships them to the
//! messaging bus with at-least-once delivery.
//!
//! `BusClient` is the trait boundary onto the external bus client library,
//! which is out of scope for the core per the purpose statement — the same
//! shape as the teacher's `risk_client.rs`/`execution_client.rs` trait-
//! wrapped gRPC clients, generalized from a sibling service to a bus.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use pvz_common::PvzResult;
use sqlx::PgPool;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::domain::Event;
use crate::store::event_store;

/// Failure from a [`BusClient`] send attempt.
#[derive(Debug, thiserror::Error)]
#[error("bus send failed: {0}")]
pub struct BusError(pub String);

/// The external messaging bus client. Implementations are responsible for
/// the wire protocol in the bus-protocol section (JSON body, id-hash
/// partition key, idempotent producer); the relay only needs `send`.
#[async_trait]
pub trait BusClient: Send + Sync {
    /// Publish `event` to the bus. Must not return `Ok` unless the broker
    /// has acknowledged the message (`acks=all`), since the relay treats a
    /// successful send as the point past which mark-as-sent is safe.
    async fn send(&self, event: &Event) -> Result<(), BusError>;
}

/// In-memory `BusClient` used in tests and as the default for the
/// `cli-server` demo binary when no broker is configured. Events sent
/// through it are simply forwarded onto an in-process channel.
pub struct ChannelBusClient {
    sender: mpsc::UnboundedSender<Event>,
}

impl ChannelBusClient {
    /// Construct a channel-backed bus client, returning it alongside the
    /// receiving half so a test or the `bus-watch` demo can drain it.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl BusClient for ChannelBusClient {
    async fn send(&self, event: &Event) -> Result<(), BusError> {
        self.sender
            .send(event.clone())
            .map_err(|e| BusError(e.to_string()))
    }
}

/// Periodic worker draining pending events from the outbox, publishing to
/// the bus, and marking them sent. One call to [`OutboxRelay::run_once`] is
/// one tick's worth of work; [`OutboxRelay::run`] drives it on an interval
/// until shut down.
pub struct OutboxRelay {
    pool: PgPool,
    bus: Arc<dyn BusClient>,
    batch_size: i64,
    period: StdDuration,
}

impl OutboxRelay {
    /// Construct a relay over `pool`, publishing through `bus`.
    #[must_use]
    pub fn new(pool: PgPool, bus: Arc<dyn BusClient>, period: StdDuration, batch_size: i64) -> Self {
        Self {
            pool,
            bus,
            batch_size,
            period,
        }
    }

    /// Drain up to `batch_size` pending events, in `created_at` order,
    /// sending then marking each as sent in turn. Aborts the batch at the
    /// first failure of either step — unsent events remain for the next
    /// tick, and mark-as-sent never runs ahead of a successful send.
    pub async fn run_once(&self) -> PvzResult<usize> {
        let events = event_store::get_pending_events(&self.pool, self.batch_size).await?;
        let mut sent = 0;
        for event in &events {
            self.bus
                .send(event)
                .await
                .map_err(|e| pvz_common::PvzError::internal(e.to_string()))?;
            event_store::mark_as_sent(&self.pool, event.id).await?;
            sent += 1;
        }
        Ok(sent)
    }

    /// Drive [`Self::run_once`] on `period` until `shutdown` fires, exiting
    /// cleanly on the next tick (or immediately if parked on the ticker).
    pub async fn run(&self, mut shutdown: oneshot::Receiver<()>) {
        let mut interval = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once().await {
                        Ok(0) => {}
                        Ok(n) => info!(relayed = n, "outbox relay tick"),
                        Err(e) => warn!(error = %e, "outbox relay tick failed; retrying next tick"),
                    }
                }
                _ = &mut shutdown => {
                    info!("outbox relay shutting down");
                    break;
                }
            }
        }
    }
}

/// `rdkafka`-backed [`BusClient`], gated behind the `kafka` feature so the
/// crate builds without a broker available. Kept deliberately thin: JSON
/// body, id-hash partition key, per the bus-protocol contract.
#[cfg(feature = "kafka")]
pub mod kafka {
    use super::{async_trait, BusClient, BusError, Event};
    use rdkafka::config::ClientConfig;
    use rdkafka::producer::{FutureProducer, FutureRecord};
    use std::time::Duration;

    /// Kafka-backed bus client.
    pub struct KafkaBusClient {
        producer: FutureProducer,
        topic: String,
    }

    impl KafkaBusClient {
        /// Construct a producer configured for idempotence (`acks=all`,
        /// `max.in.flight.requests.per.connection=1`, `retries>=5`), per
        /// the bus-protocol contract's ordering/retry requirements.
        pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, BusError> {
            let producer = ClientConfig::new()
                .set("bootstrap.servers", brokers)
                .set("enable.idempotence", "true")
                .set("acks", "all")
                .set("max.in.flight.requests.per.connection", "1")
                .set("retries", "5")
                .create()
                .map_err(|e| BusError(e.to_string()))?;
            Ok(Self {
                producer,
                topic: topic.into(),
            })
        }
    }

    #[async_trait]
    impl BusClient for KafkaBusClient {
        async fn send(&self, event: &Event) -> Result<(), BusError> {
            let body = serde_json::json!({
                "id": event.id,
                "event_type": event.event_type().to_string(),
                "payload": event.payload,
                "created_at": event.created_at,
            })
            .to_string();
            let key = event.id.to_string();
            let record = FutureRecord::to(&self.topic).payload(&body).key(&key);
            self.producer
                .send(record, Duration::from_secs(5))
                .await
                .map_err(|(e, _)| BusError(e.to_string()))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventPayload;
    use pvz_common::OrderId;

    struct FailingBus;

    #[async_trait]
    impl BusClient for FailingBus {
        async fn send(&self, _event: &Event) -> Result<(), BusError> {
            Err(BusError("simulated broker outage".to_string()))
        }
    }

    #[test]
    fn channel_bus_forwards_sent_events() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (bus, mut rx) = ChannelBusClient::new();
            let event = Event::new(EventPayload::OrderIssued {
                order_id: OrderId::from("ord1"),
            });
            bus.send(&event).await.unwrap();
            let received = rx.recv().await.unwrap();
            assert_eq!(received.id, event.id);
        });
    }
}
