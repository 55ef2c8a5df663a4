//! Network classification: the normalized view of a raw snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::network::{RawSnapshot, Transport};

/// Normalized connectivity class of the active network.
///
/// Listeners only ever see changes between these values; everything finer
/// grained in a [`RawSnapshot`] is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkClass {
    /// No internet access.
    Offline,
    /// Wi-Fi or wired Ethernet.
    WifiLike,
    /// Mobile data on a billed or capped plan.
    CellularMetered,
    /// Mobile data without metering.
    CellularUnmetered,
    /// Some other transport with confirmed internet access.
    OtherValidated,
    /// Internet claimed, but neither a known transport nor validation.
    Unknown,
}

impl NetworkClass {
    /// Returns the stable snake_case name of this class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::WifiLike => "wifi_like",
            Self::CellularMetered => "cellular_metered",
            Self::CellularUnmetered => "cellular_unmetered",
            Self::OtherValidated => "other_validated",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true for every class except [`NetworkClass::Offline`].
    #[must_use]
    pub const fn is_connected(self) -> bool {
        !matches!(self, Self::Offline)
    }

    /// Returns true for Wi-Fi or Ethernet.
    #[must_use]
    pub const fn is_wifi_like(self) -> bool {
        matches!(self, Self::WifiLike)
    }

    /// Returns true for either cellular class.
    #[must_use]
    pub const fn is_cellular(self) -> bool {
        matches!(self, Self::CellularMetered | Self::CellularUnmetered)
    }

    /// Returns true if traffic is known to be metered.
    #[must_use]
    pub const fn is_metered(self) -> bool {
        matches!(self, Self::CellularMetered)
    }
}

impl fmt::Display for NetworkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a raw snapshot.
///
/// Total and side-effect free. Rules are evaluated in order, first match wins:
///
/// 1. No internet capability: [`NetworkClass::Offline`]
/// 2. Wi-Fi or Ethernet transport: [`NetworkClass::WifiLike`]
/// 3. Cellular transport: [`NetworkClass::CellularMetered`] or
///    [`NetworkClass::CellularUnmetered`] depending on the metered flag
/// 4. Validated: [`NetworkClass::OtherValidated`]
/// 5. Otherwise: [`NetworkClass::Unknown`]
///
/// # Example
///
/// ```
/// use reachwatch::monitor::{NetworkClass, classify};
/// use reachwatch::network::{RawSnapshot, Transport};
///
/// let snapshot = RawSnapshot::online(Transport::Cellular).with_metered(true);
/// assert_eq!(classify(&snapshot), NetworkClass::CellularMetered);
/// ```
#[must_use]
pub const fn classify(snapshot: &RawSnapshot) -> NetworkClass {
    let transports = snapshot.transports;

    if !snapshot.has_internet {
        NetworkClass::Offline
    } else if transports.contains(Transport::Wifi) || transports.contains(Transport::Ethernet) {
        NetworkClass::WifiLike
    } else if transports.contains(Transport::Cellular) {
        if snapshot.metered {
            NetworkClass::CellularMetered
        } else {
            NetworkClass::CellularUnmetered
        }
    } else if snapshot.validated {
        NetworkClass::OtherValidated
    } else {
        NetworkClass::Unknown
    }
}

#[cfg(test)]
#[path = "class_tests.rs"]
mod tests;
