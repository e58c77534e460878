#![forbid(unsafe_code)]

use crate::domain::{
    AccessPoint, AuthorizationStatus, Band, Bssid, NetworkName, RoamEvent, SignalQuality,
    SignalSample,
};
use std::time::SystemTime;

/// Live connection fields as the engine tracks them. Owned exclusively by
/// the engine task; observers only ever see clones inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionState {
    pub connected: bool,
    pub network: NetworkName,
    pub bssid: Option<Bssid>,
    pub rssi: i32,
    pub noise: i32,
    pub channel: u32,
    pub band: Band,
    /// SSID/BSSID resolution currently works.
    pub has_name_access: bool,
    pub authorization: AuthorizationStatus,
    pub is_roaming: bool,
    pub last_check: Option<SystemTime>,
    pub last_scan: Option<SystemTime>,
}

impl ConnectionState {
    pub fn snr(&self) -> i32 {
        self.rssi - self.noise
    }

    pub fn quality(&self) -> SignalQuality {
        SignalQuality::from_rssi(self.connected, self.rssi)
    }

    pub(crate) fn mark_disconnected(&mut self) {
        self.connected = false;
        self.network = NetworkName::Unknown;
        self.bssid = None;
        self.rssi = 0;
        self.noise = 0;
        self.channel = 0;
        self.band = Band::Unknown;
    }
}

/// Immutable view published to the presentation layer after every state
/// change.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub connection: ConnectionState,
    pub config: config::Config,
    pub access_points: Vec<AccessPoint>,
    pub signal_history: Vec<SignalSample>,
    pub roam_history: Vec<RoamEvent>,
    /// Best-vs-next-best delta in dB on the live network, if known.
    pub differential_db: Option<i32>,
    pub quality: SignalQuality,
    pub snr: i32,
}

impl EngineSnapshot {
    pub(crate) fn initial(config: &config::Config) -> Self {
        let connection = ConnectionState::default();
        Self {
            quality: connection.quality(),
            snr: connection.snr(),
            connection,
            config: config.clone(),
            access_points: Vec::new(),
            signal_history: Vec::new(),
            roam_history: Vec::new(),
            differential_db: None,
        }
    }
}
