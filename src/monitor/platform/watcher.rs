//! Interface change subscription backed by the `netwatcher` crate.

use std::cell::Cell;
use std::fmt;
use std::sync::mpsc;
use std::thread;

use crate::monitor::{SnapshotCallback, SnapshotSubscriber, Subscription};
use crate::network::{PlatformError, SnapshotProvider};

/// [`SnapshotSubscriber`] that fires on every OS interface change.
///
/// Each update triggers a fresh `provider.snapshot()`; the observer drops
/// updates that leave the classification unchanged. A snapshot error is
/// logged and the update skipped.
///
/// The watcher delivers one update immediately on registration.
///
/// # Threading
///
/// Updates arrive on the watcher's own thread. Tearing the watcher down waits
/// for that thread, so when the observer is stopped or dropped from a
/// listener running on it, the teardown is handed to a helper thread and
/// completes once the current update returns.
///
/// # Example
///
/// ```no_run
/// use reachwatch::monitor::Observer;
/// use reachwatch::monitor::platform::NetwatcherSubscriber;
/// use reachwatch::network::platform::{NetdevProvider, PlatformOptions};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = NetdevProvider::new(PlatformOptions::default());
/// let observer = Observer::start(provider, NetwatcherSubscriber::new(provider))?;
/// observer.add_listener(|t| println!("{t}"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NetwatcherSubscriber<P> {
    provider: P,
}

impl<P> NetwatcherSubscriber<P> {
    /// Creates a subscriber that queries `provider` on each update.
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

// Wraps a live OS watcher; not reachable from unit tests.
#[cfg(not(tarpaulin_include))]
impl<P> SnapshotSubscriber for NetwatcherSubscriber<P>
where
    P: SnapshotProvider + 'static,
{
    type Subscription = WatchSubscription;

    fn subscribe(self, callback: SnapshotCallback) -> Result<WatchSubscription, PlatformError> {
        let provider = self.provider;
        let handle = netwatcher::watch_interfaces(move |update| {
            tracing::trace!(
                added = update.diff.added.len(),
                removed = update.diff.removed.len(),
                "interface update"
            );
            match provider.snapshot() {
                Ok(snapshot) => {
                    let _delivering = DeliveryGuard::enter();
                    callback(snapshot);
                }
                Err(e) => tracing::warn!("Snapshot after interface update failed: {e}"),
            }
        })
        .map_err(|e| PlatformError::platform(format!("interface watcher: {e:?}")))?;

        Ok(WatchSubscription {
            handle: Some(handle),
        })
    }
}

/// Active `netwatcher` registration. Dropping the handle stops the watcher.
pub struct WatchSubscription {
    handle: Option<netwatcher::WatchHandle>,
}

impl WatchSubscription {
    /// Returns true until [`Subscription::unsubscribe`] is called.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Subscription for WatchSubscription {
    fn unsubscribe(&mut self) {
        if let Some(handle) = self.handle.take() {
            release(handle);
            tracing::debug!("interface watcher stopped");
        }
    }
}

thread_local! {
    static DELIVERING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as delivering a watcher update.
struct DeliveryGuard {
    previous: bool,
}

impl DeliveryGuard {
    fn enter() -> Self {
        Self {
            previous: DELIVERING.replace(true),
        }
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        DELIVERING.set(self.previous);
    }
}

/// Drops a watcher handle without deadlocking the watcher thread.
///
/// Outside an update the handle is dropped inline. During an update the drop
/// would wait on the current thread, so it moves to a helper thread.
fn release<T: Send + 'static>(handle: T) {
    if !DELIVERING.get() {
        drop(handle);
        return;
    }

    tracing::warn!(
        "Observer stopped from the interface watcher thread; deferring watcher shutdown"
    );
    let (tx, rx) = mpsc::channel::<T>();
    let spawned = thread::Builder::new()
        .name("reachwatch-unwatch".to_string())
        .spawn(move || drop(rx.recv()));

    match spawned {
        Ok(_) => {
            if let Err(mpsc::SendError(handle)) = tx.send(handle) {
                std::mem::forget(handle);
            }
        }
        Err(e) => {
            tracing::error!("Failed to spawn watcher shutdown thread: {e}; leaking watcher");
            std::mem::forget(handle);
        }
    }
}

impl fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
