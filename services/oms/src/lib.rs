//! Core of the PVZ order-management service: domain model, transactional
//! store, packager, cache, use-case orchestration, and the outbox relay.
//!
//! This crate has no network surface of its own — the `pvz-gateway` and
//! `pvz-cli-server` crates are the two front doors that drive
//! [`usecase::OrderUseCase`].

#![forbid(unsafe_code)]

pub mod cache;
pub mod domain;
pub mod metrics;
pub mod outbox;
pub mod packager;
pub mod store;
pub mod tx;
pub mod usecase;

pub use cache::OrderCache;
pub use outbox::{BusClient, OutboxRelay};
pub use tx::TxManager;
pub use usecase::OrderUseCase;
