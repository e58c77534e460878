#![forbid(unsafe_code)]

use crate::domain::{AccessPoint, NetworkName};

/// Catalog entries on the live network. Empty unless the live SSID is a
/// resolved name and name resolution currently works; a synthetic
/// band-derived placeholder never matches anything.
pub fn same_network_aps<'a>(
    aps: &'a [AccessPoint],
    network: &NetworkName,
    has_name_access: bool,
) -> Vec<&'a AccessPoint> {
    if !has_name_access {
        return Vec::new();
    }
    let Some(name) = network.resolved() else {
        return Vec::new();
    };
    aps.iter()
        .filter(|ap| ap.network.as_deref() == Some(name))
        .collect()
}

/// Candidates strictly better than the live signal by the threshold,
/// strongest first. The current entry is never a candidate.
pub fn better_candidates<'a>(
    aps: &'a [AccessPoint],
    network: &NetworkName,
    has_name_access: bool,
    connected: bool,
    live_rssi: i32,
    threshold_db: i32,
) -> Vec<&'a AccessPoint> {
    if !connected {
        return Vec::new();
    }
    let mut candidates: Vec<&AccessPoint> = same_network_aps(aps, network, has_name_access)
        .into_iter()
        .filter(|ap| !ap.is_current && ap.rssi > live_rssi + threshold_db)
        .collect();
    candidates.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Band, Bssid};

    fn ap(ssid: &str, bssid: &str, rssi: i32, is_current: bool) -> AccessPoint {
        AccessPoint {
            network: Some(ssid.to_owned()),
            bssid: Some(Bssid::new(bssid)),
            rssi,
            channel: 36,
            band: Band::FiveGhz,
            is_current,
        }
    }

    #[test]
    fn candidate_above_threshold_is_selected() {
        let aps = vec![
            ap("lab", "aa:aa:aa:aa:aa:aa", -72, true),
            ap("lab", "bb:bb:bb:bb:bb:bb", -60, false),
        ];
        let network = NetworkName::Resolved("lab".to_owned());
        let better = better_candidates(&aps, &network, true, true, -72, 10);
        assert_eq!(better.len(), 1);
        assert_eq!(better[0].bssid, Some(Bssid::new("bb:bb:bb:bb:bb:bb")));
    }

    #[test]
    fn threshold_is_strict() {
        let network = NetworkName::Resolved("lab".to_owned());

        // Delta 11 over a 10 dB threshold fires.
        let aps = vec![
            ap("lab", "aa:aa:aa:aa:aa:aa", -72, true),
            ap("lab", "bb:bb:bb:bb:bb:bb", -61, false),
        ];
        assert_eq!(better_candidates(&aps, &network, true, true, -72, 10).len(), 1);

        // Delta 9 does not.
        let aps = vec![
            ap("lab", "aa:aa:aa:aa:aa:aa", -70, true),
            ap("lab", "bb:bb:bb:bb:bb:bb", -61, false),
        ];
        assert!(better_candidates(&aps, &network, true, true, -70, 10).is_empty());
    }

    #[test]
    fn current_entry_is_never_a_candidate() {
        // Even a current entry reported far stronger than the live reading.
        let aps = vec![ap("lab", "aa:aa:aa:aa:aa:aa", -40, true)];
        let network = NetworkName::Resolved("lab".to_owned());
        assert!(better_candidates(&aps, &network, true, true, -72, 10).is_empty());
    }

    #[test]
    fn strongest_candidate_first() {
        let aps = vec![
            ap("lab", "aa:aa:aa:aa:aa:aa", -80, true),
            ap("lab", "bb:bb:bb:bb:bb:bb", -55, false),
            ap("lab", "cc:cc:cc:cc:cc:cc", -45, false),
            ap("lab", "dd:dd:dd:dd:dd:dd", -60, false),
        ];
        let network = NetworkName::Resolved("lab".to_owned());
        let better = better_candidates(&aps, &network, true, true, -80, 10);
        let order: Vec<i32> = better.iter().map(|ap| ap.rssi).collect();
        assert_eq!(order, vec![-45, -55, -60]);
    }

    #[test]
    fn requires_resolved_name_and_access() {
        let aps = vec![
            ap("lab", "aa:aa:aa:aa:aa:aa", -72, true),
            ap("lab", "bb:bb:bb:bb:bb:bb", -50, false),
        ];
        let resolved = NetworkName::Resolved("lab".to_owned());
        assert!(same_network_aps(&aps, &resolved, false).is_empty());
        assert!(same_network_aps(&aps, &NetworkName::Synthetic(Band::FiveGhz), true).is_empty());
        assert!(same_network_aps(&aps, &NetworkName::Unknown, true).is_empty());
        assert!(better_candidates(&aps, &resolved, true, false, -72, 10).is_empty());
    }

    #[test]
    fn other_networks_are_ignored() {
        let aps = vec![
            ap("lab", "aa:aa:aa:aa:aa:aa", -72, true),
            ap("cafe", "bb:bb:bb:bb:bb:bb", -40, false),
        ];
        let network = NetworkName::Resolved("lab".to_owned());
        assert!(better_candidates(&aps, &network, true, true, -72, 10).is_empty());
    }
}
