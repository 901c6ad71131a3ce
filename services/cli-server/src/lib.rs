//! Interactive command server and its supporting binaries
//! (`pvz-cli-server`, `bus-watch`): the process that wires persistence,
//! cache, use-case, and outbox relay together and drives the line-oriented
//! command surface described in the component design.

#![forbid(unsafe_code)]

pub mod command_server;
pub mod commands;
pub mod duration;
pub mod seed;
