//! Transition events delivered to observer listeners.

use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

use super::NetworkClass;

/// A change from one [`NetworkClass`] to a different one.
///
/// `from` and `to` are never equal; the observer drops unchanged
/// classifications before a transition is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// The previously emitted (or baseline) class.
    pub from: NetworkClass,
    /// The new class.
    pub to: NetworkClass,
    /// When the change was detected.
    pub timestamp: SystemTime,
}

impl Transition {
    /// Creates a new transition.
    #[must_use]
    pub const fn new(from: NetworkClass, to: NetworkClass, timestamp: SystemTime) -> Self {
        Self {
            from,
            to,
            timestamp,
        }
    }

    /// Returns true if connectivity was regained.
    #[must_use]
    pub const fn is_reconnect(&self) -> bool {
        !self.from.is_connected() && self.to.is_connected()
    }

    /// Returns true if connectivity was lost.
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        self.from.is_connected() && !self.to.is_connected()
    }

    /// Seconds since the Unix epoch; pre-epoch timestamps report 0.
    #[must_use]
    pub fn unix_seconds(&self) -> u64 {
        self.timestamp
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Identifier of a registered listener, unique per observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
