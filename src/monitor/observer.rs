//! Network observer: tracks the current class and notifies on change.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use tokio::sync::mpsc::UnboundedSender;

use super::error::{ListenerError, ListenerFailure, ObserverError};
use super::listener::{SnapshotCallback, SnapshotSubscriber, Subscription};
use super::stream::TransitionStream;
use super::{ListenerId, NetworkClass, Transition, classify};
use crate::network::{RawSnapshot, SnapshotProvider};
use crate::time::{Clock, SystemClock};

type ListenerFn = Arc<dyn Fn(&Transition) -> Result<(), ListenerError> + Send + Sync>;

/// Lifecycle phase of an [`Observer`].
///
/// The uninitialized phase is represented by [`ObserverBuilder`]; an
/// `Observer` value only exists once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverPhase {
    /// Subscribed to the platform and delivering transitions.
    Active,
    /// Unsubscribed. Terminal.
    Stopped,
}

/// Configuration for starting an [`Observer`].
///
/// # Type Parameters
///
/// * `C` - The [`Clock`] used to timestamp transitions (defaults to [`SystemClock`])
///
/// # Example
///
/// ```ignore
/// use reachwatch::monitor::ObserverBuilder;
/// use reachwatch::monitor::platform::NetwatcherSubscriber;
/// use reachwatch::network::platform::{NetdevProvider, PlatformOptions};
///
/// let provider = NetdevProvider::new(PlatformOptions::default());
/// let (failures, _rx) = tokio::sync::mpsc::unbounded_channel();
/// let observer = ObserverBuilder::new()
///     .with_failure_sink(failures)
///     .start(provider, NetwatcherSubscriber::new(provider))?;
///
/// observer.add_listener(|t| println!("{t}"));
/// ```
pub struct ObserverBuilder<C = SystemClock> {
    clock: C,
    failure_sink: Option<UnboundedSender<ListenerFailure>>,
}

impl ObserverBuilder<SystemClock> {
    /// Creates a builder using the system clock and no failure channel.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock: SystemClock,
            failure_sink: None,
        }
    }
}

impl Default for ObserverBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ObserverBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverBuilder")
            .field("has_failure_sink", &self.failure_sink.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: Clock + 'static> ObserverBuilder<C> {
    /// Uses a custom clock for transition timestamps.
    #[must_use]
    pub fn with_clock<C2: Clock + 'static>(self, clock: C2) -> ObserverBuilder<C2> {
        ObserverBuilder {
            clock,
            failure_sink: self.failure_sink,
        }
    }

    /// Forwards every [`ListenerFailure`] to `sink` in addition to logging it.
    ///
    /// A closed receiver is ignored.
    #[must_use]
    pub fn with_failure_sink(mut self, sink: UnboundedSender<ListenerFailure>) -> Self {
        self.failure_sink = Some(sink);
        self
    }

    /// Starts observing.
    ///
    /// Queries `provider` once for the baseline class, then registers with
    /// `subscriber`. The baseline is not itself emitted as a transition.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::PlatformUnavailable`] if the baseline query or
    /// the subscription fails. No retry is attempted.
    pub fn start<P, S>(self, provider: P, subscriber: S) -> Result<Observer, ObserverError>
    where
        P: SnapshotProvider,
        S: SnapshotSubscriber,
    {
        let baseline = provider
            .snapshot()
            .map_err(ObserverError::PlatformUnavailable)?;
        let initial = classify(&baseline);

        let shared = Arc::new(Shared {
            dispatch: ReentrantMutex::new(()),
            stopped: AtomicBool::new(false),
            state: Mutex::new(ObserverState {
                last_class: initial,
                listeners: Vec::new(),
                next_id: 0,
            }),
            clock: Box::new(self.clock),
            failure_sink: self.failure_sink,
        });

        let weak = Arc::downgrade(&shared);
        let callback: SnapshotCallback = Arc::new(move |snapshot: RawSnapshot| {
            if let Some(shared) = weak.upgrade() {
                shared.on_snapshot(snapshot);
            }
        });

        let subscription = subscriber
            .subscribe(callback)
            .map_err(ObserverError::PlatformUnavailable)?;

        tracing::debug!(baseline = %initial, "observer started");

        Ok(Observer {
            shared,
            subscription: Mutex::new(Some(Box::new(subscription))),
        })
    }
}

/// Tracks the current [`NetworkClass`] and notifies listeners exactly when
/// it changes.
///
/// Created by [`ObserverBuilder::start`] (or [`Observer::start`]). The
/// observer is its own cancellation handle: [`Observer::stop`] unsubscribes
/// from the platform, and dropping the observer stops it too.
///
/// # Delivery
///
/// - Listeners run synchronously on the thread that delivered the snapshot,
///   in registration order. Slow work belongs behind
///   [`Observer::transitions`]
/// - A listener that returns an error or panics is reported and skipped;
///   the remaining listeners still run
/// - After `stop` returns, no listener is invoked again
///
/// Listeners may call back into the observer (register, remove, stop).
pub struct Observer {
    shared: Arc<Shared>,
    subscription: Mutex<Option<Box<dyn Subscription>>>,
}

impl Observer {
    /// Starts an observer with the default [`ObserverBuilder`].
    ///
    /// # Errors
    ///
    /// See [`ObserverBuilder::start`].
    pub fn start<P, S>(provider: P, subscriber: S) -> Result<Self, ObserverError>
    where
        P: SnapshotProvider,
        S: SnapshotSubscriber,
    {
        ObserverBuilder::new().start(provider, subscriber)
    }

    /// Returns a builder for custom clocks or failure channels.
    #[must_use]
    pub const fn builder() -> ObserverBuilder {
        ObserverBuilder::new()
    }

    /// Returns the class of the most recently processed snapshot.
    #[must_use]
    pub fn current(&self) -> NetworkClass {
        self.shared.state.lock().last_class
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ObserverPhase {
        if self.shared.is_stopped() {
            ObserverPhase::Stopped
        } else {
            ObserverPhase::Active
        }
    }

    /// Registers an infallible listener. Panics inside it are caught.
    ///
    /// On a stopped observer the listener is discarded.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Transition) + Send + Sync + 'static,
    {
        self.shared
            .register(Arc::new(move |transition: &Transition| -> Result<(), ListenerError> {
                listener(transition);
                Ok(())
            }))
    }

    /// Registers a listener whose errors are reported as [`ListenerFailure`]s.
    pub fn add_fallible_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Transition) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.shared.register(Arc::new(listener))
    }

    /// Removes a listener. Returns false if the id is not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.unregister(id)
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.state.lock().listeners.len()
    }

    /// Registers a listener that forwards transitions into an async stream.
    ///
    /// Forwarding never blocks the notification thread. The stream ends when
    /// the observer stops (immediately, if it already has); dropping the
    /// stream removes its listener.
    #[must_use]
    pub fn transitions(&self) -> TransitionStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let id = self.add_fallible_listener(move |transition: &Transition| {
            tx.send(*transition)
                .map_err(|_| ListenerError::msg("transition stream receiver dropped"))
        });
        TransitionStream::new(rx, id, Arc::downgrade(&self.shared))
    }

    /// Unsubscribes from the platform and stops all notifications.
    ///
    /// Idempotent. Waits for an in-flight dispatch on another thread to
    /// finish; when called from inside a listener, the remaining listeners of
    /// that dispatch are skipped.
    pub fn stop(&self) {
        let first = !self.shared.stopped.swap(true, Ordering::AcqRel);

        drop(self.shared.dispatch.lock());

        if let Some(mut subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
        }

        if first {
            let dropped = std::mem::take(&mut self.shared.state.lock().listeners);
            tracing::debug!(listeners = dropped.len(), "observer stopped");
        }
    }

    /// Returns true once [`Observer::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("current", &self.current())
            .field("phase", &self.phase())
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

/// State shared between the observer handle and the platform callback.
pub(super) struct Shared {
    /// Serializes snapshot processing. Reentrant so listeners can call back in.
    dispatch: ReentrantMutex<()>,
    stopped: AtomicBool,
    state: Mutex<ObserverState>,
    clock: Box<dyn Clock>,
    failure_sink: Option<UnboundedSender<ListenerFailure>>,
}

struct ObserverState {
    last_class: NetworkClass,
    /// Registration order is invocation order.
    listeners: Vec<ListenerEntry>,
    next_id: u64,
}

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    callback: ListenerFn,
}

impl Shared {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Adds a listener. After stop the callback is dropped immediately and
    /// the returned id is never registered.
    fn register(&self, callback: ListenerFn) -> ListenerId {
        let mut state = self.state.lock();
        let id = ListenerId::new(state.next_id);
        state.next_id += 1;
        // Checked under the state lock: `stop` clears the registry under the
        // same lock after setting the flag.
        if self.is_stopped() {
            tracing::debug!(listener = %id, "listener registered after stop, discarding");
            return id;
        }
        state.listeners.push(ListenerEntry { id, callback });
        id
    }

    pub(super) fn unregister(&self, id: ListenerId) -> bool {
        let mut state = self.state.lock();
        let before = state.listeners.len();
        state.listeners.retain(|entry| entry.id != id);
        state.listeners.len() != before
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.state
            .lock()
            .listeners
            .iter()
            .any(|entry| entry.id == id)
    }

    /// Processes one raw platform event.
    fn on_snapshot(&self, snapshot: RawSnapshot) {
        if self.is_stopped() {
            return;
        }

        let _dispatch = self.dispatch.lock();
        if self.is_stopped() {
            return;
        }

        let next = classify(&snapshot);
        let (transition, listeners) = {
            let mut state = self.state.lock();
            if next == state.last_class {
                tracing::trace!(class = %next, %snapshot, "classification unchanged");
                return;
            }
            let from = std::mem::replace(&mut state.last_class, next);
            (
                Transition::new(from, next, self.clock.now()),
                state.listeners.clone(),
            )
        };

        tracing::debug!(from = %transition.from, to = %transition.to, %snapshot, "network class changed");

        for entry in &listeners {
            if self.is_stopped() {
                break;
            }
            // Removed by an earlier listener in this dispatch.
            if !self.is_registered(entry.id) {
                continue;
            }
            self.invoke(entry, &transition);
        }
    }

    fn invoke(&self, entry: &ListenerEntry, transition: &Transition) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(transition)));

        let cause = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(error)) => error.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };

        let failure = ListenerFailure {
            listener: entry.id,
            transition: *transition,
            cause,
        };
        tracing::warn!("{failure}");

        if let Some(sink) = &self.failure_sink {
            let _ = sink.send(failure);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
