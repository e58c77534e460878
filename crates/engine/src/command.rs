#![forbid(unsafe_code)]

use crate::domain::{AuthorizationStatus, Bssid};
use std::time::Duration;

/// Imperative operations the presentation layer may ask of the engine.
/// Delivered through the engine's inbox and applied in arrival order.
#[derive(Debug, Clone)]
pub enum Command {
    SetMonitoringEnabled(bool),
    SetAutoRoamEnabled(bool),
    ManualRoamTo(Bssid),
    ManualScan,
    ManualRadioRestart,
    SetFriendlyName { bssid: Bssid, name: String },
    ApplyIntervals { poll: Duration, scan: Duration },
    /// Re-read the settings file and replace the running configuration.
    ReloadSettings,
    /// Suspend both timers, e.g. during a blocking UI interaction.
    Pause,
    Resume,
    /// Capability-status event from the platform (scan permission).
    AuthorizationChanged(AuthorizationStatus),
}
