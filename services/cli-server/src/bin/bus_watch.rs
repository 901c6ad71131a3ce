//! Drains the messaging bus topic and logs delivered events, demonstrating
//! the consumer side of the at-least-once contract without implementing
//! full duplicate suppression (that remains the consumer's own
//! responsibility). Requires the `kafka` feature — built against the same
//! broker the outbox relay (via `oms::outbox::kafka::KafkaBusClient`)
//! publishes to.

#[cfg(feature = "kafka")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use rdkafka::config::ClientConfig;
    use rdkafka::consumer::{Consumer, StreamConsumer};
    use rdkafka::Message;
    use std::env;
    use tracing::{info, warn};

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let brokers = env::var("PVZ_BUS_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string());
    let topic = env::var("PVZ_BUS_TOPIC").unwrap_or_else(|_| "pvz.order-events".to_string());
    let group = env::var("PVZ_BUS_CONSUMER_GROUP").unwrap_or_else(|_| "pvz-order-events".to_string());

    info!(%brokers, %topic, %group, "bus-watch: starting consumer");

    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("group.id", &group)
        .set("enable.auto.commit", "true")
        .create()
        .context("failed to build kafka consumer")?;
    consumer
        .subscribe(&[topic.as_str()])
        .context("failed to subscribe to topic")?;

    loop {
        match consumer.recv().await {
            Ok(message) => {
                let payload = message.payload().map(String::from_utf8_lossy).unwrap_or_default();
                info!(%payload, "bus-watch: event delivered");
            }
            Err(e) => warn!(error = %e, "bus-watch: consumer error"),
        }
    }
}

#[cfg(not(feature = "kafka"))]
fn main() {
    eprintln!("bus-watch requires the \"kafka\" feature: cargo run --features kafka --bin bus-watch");
    std::process::exit(1);
}
