#![forbid(unsafe_code)]

use super::{Band, Bssid};

/// One row of the catalog, rebuilt wholesale on every scan cycle. The
/// BSSID is the entity key; the live-RSSI patch applied on each poll is
/// the only incremental mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    /// Advertised SSID. `None` for hidden networks.
    pub network: Option<String>,
    pub bssid: Option<Bssid>,
    pub rssi: i32,
    pub channel: u32,
    pub band: Band,
    pub is_current: bool,
}

/// Raw scan row as the radio reports it, before classification and
/// deduplication. Also the descriptor handed back to the radio when
/// associating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedNetwork {
    pub ssid: Option<String>,
    pub bssid: Option<Bssid>,
    pub rssi: i32,
    pub channel: u32,
    pub band: Band,
}
