//! Subscription traits for platform change notifications.
//!
//! This module provides the [`SnapshotSubscriber`] trait that abstracts
//! platform-specific notification mechanisms, and the [`Subscription`]
//! handle used to cancel them.

use std::sync::Arc;

use crate::network::{PlatformError, RawSnapshot};

/// Callback invoked by a platform adapter for every raw connectivity event.
///
/// Adapters may call it from any thread, including their own notification
/// thread; it never blocks on I/O.
pub type SnapshotCallback = Arc<dyn Fn(RawSnapshot) + Send + Sync>;

/// An active platform registration.
///
/// # Idempotence
///
/// `unsubscribe` may be called any number of times, including after the
/// platform itself has torn down. Only the first call has an effect.
pub trait Subscription: Send {
    /// Cancels the registration. No callback is delivered after this returns.
    fn unsubscribe(&mut self);
}

/// Trait for platform connectivity change notification APIs.
///
/// Implementations wrap platform APIs (interface watchers, OS connectivity
/// callbacks, test fakes) and invoke the supplied callback with a fresh
/// [`RawSnapshot`] whenever connectivity may have changed.
///
/// # One-time Semantics
///
/// `subscribe` consumes `self`, enforcing one registration per subscriber.
/// A fresh subscriber is needed to subscribe again.
///
/// Closures of the form `FnOnce(SnapshotCallback) -> Result<S, PlatformError>`
/// implement this trait.
///
/// # Example
///
/// ```ignore
/// use reachwatch::monitor::{SnapshotCallback, SnapshotSubscriber, Subscription};
///
/// struct Noop;
/// impl Subscription for Noop {
///     fn unsubscribe(&mut self) {}
/// }
///
/// let subscriber = |callback: SnapshotCallback| {
///     callback(RawSnapshot::offline());
///     Ok(Noop)
/// };
/// ```
pub trait SnapshotSubscriber {
    /// The registration handle returned on success.
    type Subscription: Subscription + 'static;

    /// Registers `callback` for connectivity events.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the platform notification service cannot
    /// be registered with.
    fn subscribe(self, callback: SnapshotCallback) -> Result<Self::Subscription, PlatformError>;
}

impl<F, S> SnapshotSubscriber for F
where
    F: FnOnce(SnapshotCallback) -> Result<S, PlatformError>,
    S: Subscription + 'static,
{
    type Subscription = S;

    fn subscribe(self, callback: SnapshotCallback) -> Result<S, PlatformError> {
        self(callback)
    }
}

impl Subscription for Box<dyn Subscription> {
    fn unsubscribe(&mut self) {
        (**self).unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Transport;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSubscription {
        cancelled: Arc<AtomicUsize>,
        active: bool,
    }

    impl Subscription for CountingSubscription {
        fn unsubscribe(&mut self) {
            if std::mem::take(&mut self.active) {
                self.cancelled.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn closure_subscriber_receives_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: SnapshotCallback = Arc::new(move |s: RawSnapshot| sink.lock().unwrap().push(s));

        let cancelled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cancelled);
        let subscriber = move |cb: SnapshotCallback| -> Result<_, PlatformError> {
            cb(RawSnapshot::online(Transport::Wifi));
            Ok(CountingSubscription {
                cancelled: counter,
                active: true,
            })
        };

        let mut subscription = subscriber.subscribe(callback).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![RawSnapshot::online(Transport::Wifi)]
        );

        subscription.unsubscribe();
        subscription.unsubscribe();
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closure_subscriber_propagates_error() {
        let subscriber = |_cb: SnapshotCallback| -> Result<CountingSubscription, PlatformError> {
            Err(PlatformError::unavailable("watcher refused"))
        };

        let result = subscriber.subscribe(Arc::new(|_: RawSnapshot| {}));
        assert!(result.is_err());
    }

    #[test]
    fn boxed_subscription_forwards_unsubscribe() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let mut boxed: Box<dyn Subscription> = Box::new(CountingSubscription {
            cancelled: Arc::clone(&cancelled),
            active: true,
        });

        Subscription::unsubscribe(&mut boxed);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }
}
