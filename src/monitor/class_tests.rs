//! Tests for network classification.

use super::*;
use crate::network::TransportSet;

/// Every combination of the four boolean flags and the sixteen transport sets.
fn all_snapshots() -> Vec<RawSnapshot> {
    let mut snapshots = Vec::new();
    for mask in 0u8..16 {
        let transports: TransportSet = Transport::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, t)| t)
            .collect();
        for flags in 0u8..8 {
            snapshots.push(RawSnapshot {
                has_internet: flags & 1 != 0,
                validated: flags & 2 != 0,
                transports,
                metered: flags & 4 != 0,
            });
        }
    }
    snapshots
}

mod classify_rules {
    use super::*;

    #[test]
    fn no_internet_is_always_offline() {
        for snapshot in all_snapshots().into_iter().filter(|s| !s.has_internet) {
            assert_eq!(classify(&snapshot), NetworkClass::Offline, "{snapshot}");
        }
    }

    #[test]
    fn wifi_is_wifi_like() {
        let snapshot = RawSnapshot::online(Transport::Wifi);
        assert_eq!(classify(&snapshot), NetworkClass::WifiLike);
    }

    #[test]
    fn ethernet_is_wifi_like() {
        let snapshot = RawSnapshot::online(Transport::Ethernet).with_validated(false);
        assert_eq!(classify(&snapshot), NetworkClass::WifiLike);
    }

    #[test]
    fn wifi_wins_over_cellular() {
        let snapshot = RawSnapshot::online(Transport::Cellular)
            .with_transport(Transport::Wifi)
            .with_metered(true);
        assert_eq!(classify(&snapshot), NetworkClass::WifiLike);
    }

    #[test]
    fn metered_cellular() {
        let snapshot = RawSnapshot::online(Transport::Cellular).with_metered(true);
        assert_eq!(classify(&snapshot), NetworkClass::CellularMetered);
    }

    #[test]
    fn unmetered_cellular() {
        let snapshot = RawSnapshot::online(Transport::Cellular);
        assert_eq!(classify(&snapshot), NetworkClass::CellularUnmetered);
    }

    #[test]
    fn cellular_ignores_validation() {
        let snapshot = RawSnapshot::online(Transport::Cellular).with_validated(false);
        assert_eq!(classify(&snapshot), NetworkClass::CellularUnmetered);
    }

    #[test]
    fn validated_other_transport() {
        let snapshot = RawSnapshot::online(Transport::Other);
        assert_eq!(classify(&snapshot), NetworkClass::OtherValidated);
    }

    #[test]
    fn validated_without_transport() {
        let snapshot = RawSnapshot {
            has_internet: true,
            validated: true,
            transports: TransportSet::EMPTY,
            metered: false,
        };
        assert_eq!(classify(&snapshot), NetworkClass::OtherValidated);
    }

    #[test]
    fn unvalidated_other_is_unknown() {
        let snapshot = RawSnapshot::online(Transport::Other).with_validated(false);
        assert_eq!(classify(&snapshot), NetworkClass::Unknown);
    }

    #[test]
    fn deterministic_over_every_snapshot() {
        for snapshot in all_snapshots() {
            assert_eq!(classify(&snapshot), classify(&snapshot));
        }
    }
}

mod network_class {
    use super::*;

    #[test]
    fn only_offline_is_disconnected() {
        assert!(!NetworkClass::Offline.is_connected());
        assert!(NetworkClass::WifiLike.is_connected());
        assert!(NetworkClass::Unknown.is_connected());
    }

    #[test]
    fn cellular_predicates() {
        assert!(NetworkClass::CellularMetered.is_cellular());
        assert!(NetworkClass::CellularUnmetered.is_cellular());
        assert!(!NetworkClass::WifiLike.is_cellular());

        assert!(NetworkClass::CellularMetered.is_metered());
        assert!(!NetworkClass::CellularUnmetered.is_metered());
    }

    #[test]
    fn wifi_like_predicate() {
        assert!(NetworkClass::WifiLike.is_wifi_like());
        assert!(!NetworkClass::OtherValidated.is_wifi_like());
    }

    #[test]
    fn display_matches_serde_name() {
        for class in [
            NetworkClass::Offline,
            NetworkClass::WifiLike,
            NetworkClass::CellularMetered,
            NetworkClass::CellularUnmetered,
            NetworkClass::OtherValidated,
            NetworkClass::Unknown,
        ] {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{class}\""));
        }
    }
}
