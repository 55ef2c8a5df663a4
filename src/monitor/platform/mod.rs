//! Platform connectivity change notifications.
//!
//! [`NetwatcherSubscriber`] registers with the OS interface watcher
//! (netlink on Linux, `NotifyIpInterfaceChange` on Windows, the system
//! configuration framework on Apple platforms) and re-queries a
//! [`SnapshotProvider`](crate::network::SnapshotProvider) for every update.

mod watcher;

pub use watcher::{NetwatcherSubscriber, WatchSubscription};
