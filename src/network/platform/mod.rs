//! Platform connectivity adapter built on interface enumeration.
//!
//! The OS is queried through the `netdev` crate, which works on Linux, macOS
//! and Windows. Raw interfaces are first reduced to [`InterfaceInfo`] values
//! and then folded into a single [`RawSnapshot`] by [`derive_snapshot`], a
//! pure function that holds all the policy.
//!
//! # Derivation rules
//!
//! - The *active* interface is the OS default-route interface, provided it is
//!   up, is not loopback and carries at least one address
//! - `has_internet`: an active interface exists (and has a gateway when
//!   [`PlatformOptions::require_gateway`] is set)
//! - `validated`: the active interface has a default gateway
//! - `transports`: the transport of the active interface
//! - `metered`: the active interface is cellular and
//!   [`PlatformOptions::cellular_metered`] is set

mod interfaces;

pub use interfaces::{NetdevProvider, list_interfaces};

use std::fmt;

use serde::Serialize;

use super::{RawSnapshot, Transport, TransportSet};

/// Tunables for turning interface state into a [`RawSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformOptions {
    /// Report cellular transports as metered.
    pub cellular_metered: bool,
    /// Require a default gateway before reporting internet access.
    pub require_gateway: bool,
}

impl PlatformOptions {
    /// Creates options with the built-in defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cellular_metered: true,
            require_gateway: false,
        }
    }
}

impl Default for PlatformOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform-neutral summary of one network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    /// OS interface index.
    pub index: u32,
    /// Interface name (e.g. `wlan0`, `en0`, `Ethernet`).
    pub name: String,
    /// Transport inferred from the link type.
    pub transport: Transport,
    /// Administratively up.
    pub is_up: bool,
    /// Loopback interface.
    pub is_loopback: bool,
    /// Carries the default route.
    pub is_default: bool,
    /// A default gateway is reachable through this interface.
    pub has_gateway: bool,
    /// Number of IPv4 + IPv6 addresses assigned.
    pub address_count: usize,
}

impl InterfaceInfo {
    /// Returns true if this interface can carry traffic off the host.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.is_up && !self.is_loopback && self.address_count > 0
    }
}

impl fmt::Display for InterfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({}) {} addrs={}",
            self.index,
            self.name,
            self.transport,
            if self.is_up { "up" } else { "down" },
            self.address_count,
        )?;
        if self.is_default {
            write!(f, " default")?;
        }
        if self.has_gateway {
            write!(f, " gateway")?;
        }
        Ok(())
    }
}

/// Folds a list of interfaces into one connectivity snapshot.
///
/// See the module documentation for the rules.
#[must_use]
pub fn derive_snapshot(interfaces: &[InterfaceInfo], options: PlatformOptions) -> RawSnapshot {
    let Some(active) = interfaces
        .iter()
        .find(|iface| iface.is_default && iface.is_usable())
    else {
        return RawSnapshot::offline();
    };

    let has_internet = active.has_gateway || !options.require_gateway;
    if !has_internet {
        return RawSnapshot::offline();
    }

    let metered = active.transport == Transport::Cellular && options.cellular_metered;

    RawSnapshot {
        has_internet,
        validated: active.has_gateway,
        transports: TransportSet::only(active.transport),
        metered,
    }
}
