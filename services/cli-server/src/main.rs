//! Process entry point: wires persistence, cache, use-case, and outbox relay
//! together, then either runs the interactive command server (alongside the
//! gRPC/HTTP gateway) or the `seed` batch-generation subcommand.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use oms::cache::{EvictionPolicy, OrderCache};
use oms::outbox::{ChannelBusClient, OutboxRelay};
use oms::tx::TxManager;
use oms::usecase::OrderUseCase;
use pvz_common::constants::{
    DEFAULT_CACHE_MAX_ITEMS, DEFAULT_CACHE_TTL_SECS, DEFAULT_RELAY_BATCH_SIZE, DEFAULT_RELAY_PERIOD_SECS,
};
use pvz_common::Config;
use pvz_cli_server::command_server::CommandServer;
use pvz_cli_server::seed;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::oneshot;
use tracing::info;

#[derive(Parser)]
#[command(name = "pvz-cli-server")]
#[command(about = "Interactive command server for a single PVZ instance")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive command server and the gRPC/HTTP gateway.
    Serve {
        /// Initial size of the worker pool.
        #[arg(long, default_value_t = 4)]
        workers: usize,
        /// Address the gRPC listener binds to.
        #[arg(long, default_value = "0.0.0.0:50051")]
        grpc_addr: SocketAddr,
        /// Address the HTTP/JSON gateway mirror binds to.
        #[arg(long, default_value = "0.0.0.0:8080")]
        http_addr: SocketAddr,
    },
    /// Populate the current PVZ with synthetic accepted orders.
    Seed {
        /// Number of orders to create.
        #[arg(long, default_value_t = 100)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration from environment")?;

    info!(pvz_id = %config.pvz_id, "starting pvz-cli-server");

    let pool = PgPoolOptions::new()
        .connect(&config.database.url())
        .await
        .context("connecting to postgres")?;
    oms::store::run_migrations(&pool).await.context("running migrations")?;

    let tx = Arc::new(TxManager::new(pool.clone()));
    let cache = Arc::new(OrderCache::new(
        chrono::Duration::seconds(DEFAULT_CACHE_TTL_SECS as i64),
        DEFAULT_CACHE_MAX_ITEMS,
        EvictionPolicy::Lru,
    ));
    let use_case = Arc::new(OrderUseCase::new(config.pvz_id.clone(), tx, cache));

    let (bus, mut bus_events) = ChannelBusClient::new();
    tokio::spawn(async move {
        while let Some(event) = bus_events.recv().await {
            info!(event_id = %event.id, event_type = %event.event_type(), "bus: event delivered");
        }
    });

    let relay = OutboxRelay::new(
        pool.clone(),
        Arc::new(bus),
        StdDuration::from_secs(DEFAULT_RELAY_PERIOD_SECS),
        DEFAULT_RELAY_BATCH_SIZE,
    );
    let (relay_shutdown_tx, relay_shutdown_rx) = oneshot::channel();
    let relay_handle = tokio::spawn(async move { relay.run(relay_shutdown_rx).await });

    match cli.command {
        Command::Seed { count } => {
            let created = seed::run(&use_case, count).await?;
            info!(created, "seed: done");
        }
        Command::Serve {
            workers,
            grpc_addr,
            http_addr,
        } => {
            let command_server = CommandServer::spawn(use_case.clone(), workers);
            info!(workers, "command server ready, reading stdin");

            tokio::select! {
                res = pvz_gateway::server::serve(use_case.clone(), grpc_addr, http_addr) => {
                    res.context("gateway exited")?;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                }
            }

            command_server.shutdown();
        }
    }

    let _ = relay_shutdown_tx.send(());
    let _ = relay_handle.await;
    Ok(())
}
