//! Integration test harness: aggregates `tests/integration/` into one
//! binary. All tests here touch a real Postgres instance via
//! `testcontainers-modules` and are `#[ignore]`d by default.

#[path = "integration/scenarios.rs"]
mod scenarios;
