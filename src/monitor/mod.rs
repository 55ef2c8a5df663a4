//! Monitor layer for detecting network class changes.
//!
//! This module provides types and functions for:
//! - Classifying raw snapshots ([`NetworkClass`], [`classify`])
//! - Representing class changes ([`Transition`], [`ListenerId`])
//! - Platform subscription seams ([`SnapshotSubscriber`], [`Subscription`], [`platform`])
//! - Observing and notifying ([`Observer`], [`ObserverBuilder`], [`TransitionStream`])
//! - Error handling ([`ObserverError`], [`ListenerError`], [`ListenerFailure`])

mod class;
mod error;
mod listener;
mod observer;
pub mod platform;
mod stream;
mod transition;

pub use class::{NetworkClass, classify};
pub use error::{ListenerError, ListenerFailure, ObserverError};
pub use listener::{SnapshotCallback, SnapshotSubscriber, Subscription};
pub use observer::{Observer, ObserverBuilder, ObserverPhase};
pub use stream::TransitionStream;
pub use transition::{ListenerId, Transition};
