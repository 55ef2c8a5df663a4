//! `netdev` backed interface enumeration.

use netdev::interface::InterfaceType;

use super::{InterfaceInfo, PlatformOptions, derive_snapshot};
use crate::network::{PlatformError, RawSnapshot, SnapshotProvider, Transport};

/// [`SnapshotProvider`] that enumerates the host's interfaces with `netdev`.
///
/// Cheap to clone; every call to [`SnapshotProvider::snapshot`] performs a
/// fresh enumeration.
///
/// # Example
///
/// ```no_run
/// use reachwatch::network::SnapshotProvider;
/// use reachwatch::network::platform::{NetdevProvider, PlatformOptions};
///
/// let provider = NetdevProvider::new(PlatformOptions::default());
/// let snapshot = provider.snapshot()?;
/// println!("{snapshot}");
/// # Ok::<(), reachwatch::network::PlatformError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NetdevProvider {
    options: PlatformOptions,
}

impl NetdevProvider {
    /// Creates a provider with the given derivation options.
    #[must_use]
    pub const fn new(options: PlatformOptions) -> Self {
        Self { options }
    }

    /// Returns the derivation options.
    #[must_use]
    pub const fn options(&self) -> PlatformOptions {
        self.options
    }
}

impl SnapshotProvider for NetdevProvider {
    fn snapshot(&self) -> Result<RawSnapshot, PlatformError> {
        let interfaces = list_interfaces()?;
        Ok(derive_snapshot(&interfaces, self.options))
    }
}

/// Lists every interface on the host.
///
/// # Errors
///
/// Returns [`PlatformError::Unavailable`] if the OS reports no interfaces at
/// all (not even loopback), which means the interface table could not be read.
///
/// # Coverage Note
///
/// Excluded from coverage - depends on the host's real interface table.
#[cfg(not(tarpaulin_include))]
pub fn list_interfaces() -> Result<Vec<InterfaceInfo>, PlatformError> {
    let interfaces: Vec<InterfaceInfo> = netdev::get_interfaces()
        .iter()
        .map(to_interface_info)
        .collect();

    if interfaces.is_empty() {
        return Err(PlatformError::unavailable(
            "interface table is empty or unreadable",
        ));
    }

    tracing::trace!(count = interfaces.len(), "enumerated interfaces");
    Ok(interfaces)
}

#[cfg(not(tarpaulin_include))]
fn to_interface_info(iface: &netdev::Interface) -> InterfaceInfo {
    InterfaceInfo {
        index: iface.index,
        name: iface.name.clone(),
        transport: transport_for(iface.if_type),
        is_up: iface.is_up(),
        is_loopback: iface.is_loopback(),
        is_default: iface.default,
        has_gateway: iface.gateway.is_some(),
        address_count: iface.ipv4.len() + iface.ipv6.len(),
    }
}

/// Maps a link-layer interface type onto a [`Transport`].
const fn transport_for(if_type: InterfaceType) -> Transport {
    match if_type {
        InterfaceType::Wireless80211 => Transport::Wifi,
        InterfaceType::Wwanpp | InterfaceType::Wwanpp2 => Transport::Cellular,
        InterfaceType::Ethernet
        | InterfaceType::Ethernet3Megabit
        | InterfaceType::FastEthernetT
        | InterfaceType::FastEthernetFx
        | InterfaceType::GigabitEthernet => Transport::Ethernet,
        _ => Transport::Other,
    }
}
