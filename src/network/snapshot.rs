//! Raw connectivity snapshot types reported by platform adapters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A physical or logical transport carrying the active network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Wireless LAN (Wi-Fi).
    Wifi,
    /// Mobile data (2G/3G/4G/5G, WWAN modems).
    Cellular,
    /// Wired Ethernet.
    Ethernet,
    /// Anything else: tunnels, PPP, bridges, unknown link types.
    Other,
}

impl Transport {
    /// All transports, in a stable order.
    pub const ALL: [Self; 4] = [Self::Wifi, Self::Cellular, Self::Ethernet, Self::Other];

    const fn bit(self) -> u8 {
        match self {
            Self::Wifi => 1,
            Self::Cellular => 1 << 1,
            Self::Ethernet => 1 << 2,
            Self::Other => 1 << 3,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wifi => write!(f, "wifi"),
            Self::Cellular => write!(f, "cellular"),
            Self::Ethernet => write!(f, "ethernet"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A set of [`Transport`]s.
///
/// Stored as a bitmask so snapshots stay `Copy`. Serializes as a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Transport>", into = "Vec<Transport>")]
pub struct TransportSet(u8);

impl TransportSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Creates a set holding a single transport.
    #[must_use]
    pub const fn only(transport: Transport) -> Self {
        Self(transport.bit())
    }

    /// Returns a copy of this set with `transport` added.
    #[must_use]
    pub const fn with(self, transport: Transport) -> Self {
        Self(self.0 | transport.bit())
    }

    /// Adds a transport to the set.
    pub const fn insert(&mut self, transport: Transport) {
        self.0 |= transport.bit();
    }

    /// Returns true if the set holds `transport`.
    #[must_use]
    pub const fn contains(self, transport: Transport) -> bool {
        self.0 & transport.bit() != 0
    }

    /// Returns true if the set holds no transports.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the transports in the set, in [`Transport::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Transport> {
        Transport::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<Transport> for TransportSet {
    fn from_iter<I: IntoIterator<Item = Transport>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<Vec<Transport>> for TransportSet {
    fn from(transports: Vec<Transport>) -> Self {
        transports.into_iter().collect()
    }
}

impl From<TransportSet> for Vec<Transport> {
    fn from(set: TransportSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for TransportSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        for (i, transport) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{transport}")?;
        }
        Ok(())
    }
}

/// A point-in-time description of connectivity as reported by the platform.
///
/// Produced by a platform adapter for every notification; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// The active network claims to provide internet access.
    pub has_internet: bool,
    /// Internet access was confirmed (gateway present, probe succeeded, ...).
    pub validated: bool,
    /// Transports carrying the active network.
    pub transports: TransportSet,
    /// Traffic on the active network is billed or capped.
    pub metered: bool,
}

impl RawSnapshot {
    /// A snapshot with no internet access and no transports.
    #[must_use]
    pub const fn offline() -> Self {
        Self {
            has_internet: false,
            validated: false,
            transports: TransportSet::EMPTY,
            metered: false,
        }
    }

    /// A validated, unmetered internet connection over a single transport.
    #[must_use]
    pub const fn online(transport: Transport) -> Self {
        Self {
            has_internet: true,
            validated: true,
            transports: TransportSet::only(transport),
            metered: false,
        }
    }

    /// Sets the validated flag.
    #[must_use]
    pub const fn with_validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }

    /// Sets the metered flag.
    #[must_use]
    pub const fn with_metered(mut self, metered: bool) -> Self {
        self.metered = metered;
        self
    }

    /// Adds a transport.
    #[must_use]
    pub const fn with_transport(mut self, transport: Transport) -> Self {
        self.transports = self.transports.with(transport);
        self
    }
}

impl fmt::Display for RawSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "internet={} validated={} transports={} metered={}",
            self.has_internet, self.validated, self.transports, self.metered
        )
    }
}
