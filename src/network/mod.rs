//! Network layer for querying raw connectivity state.
//!
//! This module provides types and traits for:
//! - Representing platform connectivity snapshots ([`RawSnapshot`])
//! - Transport classification ([`Transport`], [`TransportSet`])
//! - Querying the current snapshot ([`SnapshotProvider`])
//! - The cross-platform interface adapter ([`platform`])

pub mod platform;
mod provider;
mod snapshot;

pub use provider::{PlatformError, SnapshotProvider};
pub use snapshot::{RawSnapshot, Transport, TransportSet};
