//! reachwatch: network reachability classifier
//!
//! A library that normalizes low-level connectivity signals into a small,
//! stable [`NetworkClass`](monitor::NetworkClass) and notifies listeners
//! exactly once per real change.
//!
//! - [`network`]: raw snapshots and the platform providers that produce them
//! - [`monitor`]: classification and the change-notification [`Observer`](monitor::Observer)
//! - [`webhook`]: delivery of transitions to HTTP endpoints
//! - [`config`]: CLI and TOML configuration for the `reachwatch` binary

pub mod config;
pub mod monitor;
pub mod network;
pub mod time;
pub mod webhook;
