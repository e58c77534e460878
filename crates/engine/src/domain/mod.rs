#![forbid(unsafe_code)]

mod access_point;
mod network;
mod roam_event;
mod signal;

pub use access_point::{AccessPoint, ScannedNetwork};
pub use network::{AuthorizationStatus, Band, Bssid, NetworkName};
pub use roam_event::RoamEvent;
pub use signal::{SignalQuality, SignalSample};
