//! Async stream adapter over observer transitions.

use std::fmt;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::Stream;

use super::ListenerId;
use super::Transition;
use super::observer::Shared;

/// Stream of [`Transition`]s returned by [`Observer::transitions`].
///
/// Ends once the observer stops. Dropping the stream unregisters its
/// listener.
///
/// [`Observer::transitions`]: super::Observer::transitions
pub struct TransitionStream {
    rx: UnboundedReceiver<Transition>,
    listener: ListenerId,
    shared: Weak<Shared>,
}

impl TransitionStream {
    pub(super) const fn new(
        rx: UnboundedReceiver<Transition>,
        listener: ListenerId,
        shared: Weak<Shared>,
    ) -> Self {
        Self {
            rx,
            listener,
            shared,
        }
    }

    /// The id of the listener feeding this stream.
    #[must_use]
    pub const fn listener_id(&self) -> ListenerId {
        self.listener
    }
}

impl fmt::Debug for TransitionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionStream")
            .field("listener", &self.listener)
            .field("observer_alive", &(self.shared.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

impl Stream for TransitionStream {
    type Item = Transition;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for TransitionStream {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.unregister(self.listener);
        }
    }
}
