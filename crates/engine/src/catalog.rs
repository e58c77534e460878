#![forbid(unsafe_code)]

use crate::domain::{AccessPoint, Bssid, NetworkName, ScannedNetwork};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::SystemTime;

/// Live connection fields captured when a scan is dispatched.
/// Classification and the differential snapshot are computed against
/// these, not against whatever the connection looks like by the time the
/// scan lands.
#[derive(Debug, Clone)]
pub struct LiveContext {
    pub network: NetworkName,
    pub bssid: Option<Bssid>,
    pub channel: u32,
    pub rssi: i32,
}

/// Top two same-network entries frozen at scan time. Valid only while the
/// live network still matches; the connected side is substituted with the
/// live RSSI so the delta ticks between scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferentialSnapshot {
    pub at: SystemTime,
    pub network: String,
    pub best_bssid: Option<Bssid>,
    pub best_rssi: i32,
    pub second_bssid: Option<Bssid>,
    pub second_rssi: i32,
}

#[derive(Debug, Default)]
pub struct ApCatalog {
    aps: Vec<AccessPoint>,
    snapshot: Option<DifferentialSnapshot>,
    scanned: HashMap<Bssid, ScannedNetwork>,
}

impl ApCatalog {
    pub fn aps(&self) -> &[AccessPoint] {
        &self.aps
    }

    pub fn snapshot(&self) -> Option<&DifferentialSnapshot> {
        self.snapshot.as_ref()
    }

    /// Raw scan descriptor for a BSSID, kept so a roam can reuse it
    /// instead of re-scanning.
    pub fn cached(&self, bssid: &Bssid) -> Option<&ScannedNetwork> {
        self.scanned.get(bssid)
    }

    pub fn by_bssid(&self, bssid: &Bssid) -> Option<&AccessPoint> {
        self.aps.iter().find(|ap| ap.bssid.as_ref() == Some(bssid))
    }

    /// Replace the catalog with a fresh scan cycle: classify, deduplicate
    /// by BSSID keeping the strongest reading, sort deterministically, and
    /// recompute the differential snapshot.
    pub fn ingest(&mut self, networks: Vec<ScannedNetwork>, live: &LiveContext, at: SystemTime) {
        self.scanned = networks
            .iter()
            .filter_map(|n| n.bssid.clone().map(|bssid| (bssid, n.clone())))
            .collect();

        let mut aps: Vec<AccessPoint> = networks.into_iter().map(|n| classify(n, live)).collect();
        dedupe(&mut aps);
        aps.sort_by(|a, b| a.channel.cmp(&b.channel).then_with(|| a.bssid.cmp(&b.bssid)));
        self.snapshot = build_snapshot(&aps, live, at);
        self.aps = aps;
    }

    /// Live-RSSI patch applied on every poll: re-mark the current entry
    /// and give it the freshly measured RSSI.
    pub fn patch_live(&mut self, bssid: Option<&Bssid>, rssi: i32) {
        for ap in &mut self.aps {
            let current = bssid.is_some() && ap.bssid.as_ref() == bssid;
            ap.is_current = current;
            if current {
                ap.rssi = rssi;
            }
        }
    }

    /// Best-vs-second delta in dB, substituting the live RSSI for
    /// whichever side is the connected AP. `None` when no snapshot exists
    /// or it was taken on a different network.
    pub fn differential(&self, live: &LiveContext) -> Option<i32> {
        let snap = self.snapshot.as_ref()?;
        if live.network.resolved() != Some(snap.network.as_str()) {
            return None;
        }
        let mut best = snap.best_rssi;
        let mut second = snap.second_rssi;
        if live.bssid.is_some() {
            if live.bssid == snap.best_bssid {
                best = live.rssi;
            } else if live.bssid == snap.second_bssid {
                second = live.rssi;
            }
        }
        Some(best - second)
    }
}

fn classify(n: ScannedNetwork, live: &LiveContext) -> AccessPoint {
    // Primary rule: exact BSSID match. Fallback when either BSSID is
    // unreadable: same channel plus the exact RSSI captured at dispatch.
    // Two APs sharing both will misclassify; this is a known approximation.
    let is_current = match (&live.bssid, &n.bssid) {
        (Some(live_bssid), Some(bssid)) => live_bssid == bssid,
        _ => n.channel == live.channel && n.rssi == live.rssi,
    };
    AccessPoint {
        network: n.ssid,
        bssid: n.bssid,
        rssi: n.rssi,
        channel: n.channel,
        band: n.band,
        is_current,
    }
}

/// At most one entry per BSSID, keeping the strongest RSSI. Entries with
/// no BSSID collapse into one slot.
fn dedupe(aps: &mut Vec<AccessPoint>) {
    let mut seen: HashMap<Option<Bssid>, usize> = HashMap::new();
    let mut kept: Vec<AccessPoint> = Vec::with_capacity(aps.len());
    for ap in aps.drain(..) {
        match seen.entry(ap.bssid.clone()) {
            Entry::Occupied(entry) => {
                let idx = *entry.get();
                if ap.rssi > kept[idx].rssi {
                    kept[idx] = ap;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(kept.len());
                kept.push(ap);
            }
        }
    }
    *aps = kept;
}

fn build_snapshot(
    aps: &[AccessPoint],
    live: &LiveContext,
    at: SystemTime,
) -> Option<DifferentialSnapshot> {
    let name = live.network.resolved()?;
    let mut same: Vec<&AccessPoint> = aps
        .iter()
        .filter(|ap| ap.network.as_deref() == Some(name))
        .collect();
    if same.len() < 2 {
        return None;
    }
    same.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    Some(DifferentialSnapshot {
        at,
        network: name.to_owned(),
        best_bssid: same[0].bssid.clone(),
        best_rssi: same[0].rssi,
        second_bssid: same[1].bssid.clone(),
        second_rssi: same[1].rssi,
    })
}
