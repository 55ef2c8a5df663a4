//! Error types for the monitor layer.

use crate::network::PlatformError;
use thiserror::Error;

use super::{ListenerId, Transition};

/// Error returned by a fallible listener.
///
/// Wraps any error type; the observer only needs its message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ListenerError(Box<dyn std::error::Error + Send + Sync>);

impl ListenerError {
    /// Wraps an existing error.
    pub fn new(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(error))
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self(message.into())
    }
}

/// A listener returned an error or panicked while handling a transition.
///
/// Reported through `tracing` and the observer's optional failure channel.
/// Never affects other listeners or the observer's state.
#[derive(Debug, Clone, Error)]
#[error("Listener {listener} failed on {transition}: {cause}")]
pub struct ListenerFailure {
    /// The listener that failed.
    pub listener: ListenerId,
    /// The transition it was handling.
    pub transition: Transition,
    /// Error message or panic payload.
    pub cause: String,
}

/// Error type for observer operations.
///
/// Describes failures of the network observer.
/// Callers decide recovery strategy based on the error variant.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// The platform connectivity service could not be obtained at start.
    ///
    /// Fatal to that start attempt; not retried automatically.
    #[error("Platform unavailable: {0}")]
    PlatformUnavailable(#[source] PlatformError),

    /// A registered listener failed.
    #[error(transparent)]
    ListenerFailure(#[from] ListenerFailure),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::NetworkClass;
    use std::error::Error;
    use std::time::SystemTime;

    fn failure() -> ListenerFailure {
        ListenerFailure {
            listener: ListenerId::new(3),
            transition: Transition::new(
                NetworkClass::WifiLike,
                NetworkClass::Offline,
                SystemTime::UNIX_EPOCH,
            ),
            cause: "boom".to_string(),
        }
    }

    mod listener_error {
        use super::*;

        #[test]
        fn msg_displays_message() {
            assert_eq!(ListenerError::msg("queue full").to_string(), "queue full");
        }

        #[test]
        fn new_wraps_source_error() {
            let io = std::io::Error::other("disk gone");
            assert_eq!(ListenerError::new(io).to_string(), "disk gone");
        }
    }

    mod listener_failure {
        use super::*;

        #[test]
        fn displays_listener_transition_and_cause() {
            assert_eq!(
                failure().to_string(),
                "Listener #3 failed on wifi_like -> offline: boom"
            );
        }
    }

    mod observer_error {
        use super::*;

        #[test]
        fn platform_unavailable_displays_with_context() {
            let error = ObserverError::PlatformUnavailable(PlatformError::unavailable("no wifi"));
            assert!(error.to_string().contains("Platform unavailable"));
            assert!(error.to_string().contains("no wifi"));
        }

        #[test]
        fn platform_unavailable_preserves_source_chain() {
            let error = ObserverError::PlatformUnavailable(PlatformError::Platform {
                message: "inner error".to_string(),
            });

            let source = error.source();
            assert!(source.is_some());
            assert!(source.unwrap().to_string().contains("inner error"));
        }

        #[test]
        fn from_listener_failure_conversion() {
            let error: ObserverError = failure().into();
            assert!(matches!(error, ObserverError::ListenerFailure(_)));
            assert!(error.to_string().contains("boom"));
        }
    }
}
