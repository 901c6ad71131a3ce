//! Shared primitives for the PVZ order-management workspace.
//!
//! Every other crate in this workspace depends on `pvz-common` for the
//! error kinds that carry business-rule meaning across layer boundaries,
//! the environment-driven startup configuration, and the handful of
//! constants (return window, packaging limits) that are fixed by the
//! domain rather than by configuration.

#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;

pub use config::Config;
pub use error::{PvzError, PvzResult};
pub use ids::{OrderId, PvzId, RecipientId};
