//! Snapshot provider trait and platform error types.

use super::RawSnapshot;
use thiserror::Error;

/// Error type for platform connectivity queries.
///
/// Describes what went wrong without dictating recovery strategy.
/// Callers decide how to handle each error variant.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The connectivity service could not be obtained at all.
    #[error("Connectivity service unavailable: {reason}")]
    Unavailable {
        /// Why the service could not be reached.
        reason: String,
    },

    /// An OS notification or query API reported a failure.
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform-specific failure.
        message: String,
    },
}

impl PlatformError {
    /// Creates an `Unavailable` error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a `Platform` error.
    #[must_use]
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }
}

/// One-shot query of the current connectivity state.
///
/// # Design
///
/// - Platform adapters implement this trait; the observer never talks to
///   the OS directly
/// - Closures returning `Result<RawSnapshot, PlatformError>` implement it,
///   which keeps tests free of boilerplate
///
/// # Example
///
/// ```
/// use reachwatch::network::{PlatformError, RawSnapshot, SnapshotProvider, Transport};
///
/// let provider = || -> Result<RawSnapshot, PlatformError> { Ok(RawSnapshot::online(Transport::Wifi)) };
/// assert!(provider.snapshot().unwrap().has_internet);
/// ```
pub trait SnapshotProvider: Send + Sync {
    /// Queries the platform for the current connectivity snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when:
    /// - The connectivity service cannot be reached (`PlatformError::Unavailable`)
    /// - An OS API call fails (`PlatformError::Platform`)
    fn snapshot(&self) -> Result<RawSnapshot, PlatformError>;
}

impl<F> SnapshotProvider for F
where
    F: Fn() -> Result<RawSnapshot, PlatformError> + Send + Sync,
{
    fn snapshot(&self) -> Result<RawSnapshot, PlatformError> {
        self()
    }
}
