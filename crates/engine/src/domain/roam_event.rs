#![forbid(unsafe_code)]

use super::Bssid;
use std::time::SystemTime;

/// A roam that actually changed the association. No-op roams never
/// produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoamEvent {
    pub at: SystemTime,
    pub from: Option<Bssid>,
    pub to: Option<Bssid>,
    pub rssi_before: i32,
    pub rssi_after: i32,
}
