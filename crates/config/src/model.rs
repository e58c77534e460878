#![forbid(unsafe_code)]

use crate::ap_names::ApNameDirectory;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub monitor: Monitor,
    pub roam: Roam,
    pub scan: Scan,
    pub ap_names: ApNameDirectory,
}

impl Config {
    /// Force every value into its valid range. Applied on load and on
    /// every change coming in from the outside.
    pub fn clamp(mut self) -> Self {
        self.monitor = self.monitor.clamp();
        self.roam = self.roam.clamp();
        self.scan = self.scan.clamp();
        self
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Monitor {
    /// Master enable switch. When false, all polling/scanning/roaming halts.
    pub enabled: bool,

    /// Signal poll cadence in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub poll_interval: Duration,
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl Monitor {
    pub fn clamp(mut self) -> Self {
        self.poll_interval = self.poll_interval.max(Duration::from_secs(1));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Roam {
    /// Whether the engine may re-associate on its own.
    pub auto: bool,

    /// Minimum dB a candidate must beat the live RSSI by.
    pub threshold_db: i32,

    /// If enabled, a failed passwordless association may be retried with a
    /// saved credential. Off by default so the daemon never touches secrets
    /// unless asked to.
    pub allow_credential_fallback: bool,
}

impl Default for Roam {
    fn default() -> Self {
        Self {
            auto: true,
            threshold_db: 10,
            allow_credential_fallback: false,
        }
    }
}

impl Roam {
    pub fn clamp(mut self) -> Self {
        self.threshold_db = self.threshold_db.clamp(5, 25);
        self
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Scan {
    /// Full-scan cadence in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub interval: Duration,

    /// Trigger an immediate scan when current RSSI is at or below
    /// `weak_signal_threshold_dbm`.
    pub on_weak_signal: bool,

    pub weak_signal_threshold_dbm: i32,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            on_weak_signal: true,
            weak_signal_threshold_dbm: -70,
        }
    }
}

impl Scan {
    pub fn clamp(mut self) -> Self {
        self.interval = self.interval.max(Duration::from_secs(5));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert!(config.monitor.enabled);
        assert_eq!(config.monitor.poll_interval, Duration::from_secs(5));
        assert_eq!(config.scan.interval, Duration::from_secs(30));
        assert!(config.scan.on_weak_signal);
        assert_eq!(config.scan.weak_signal_threshold_dbm, -70);
        assert!(config.roam.auto);
        assert_eq!(config.roam.threshold_db, 10);
        assert!(!config.roam.allow_credential_fallback);
    }

    #[test]
    fn clamp_forces_valid_ranges() {
        let config = Config {
            monitor: Monitor {
                enabled: true,
                poll_interval: Duration::ZERO,
            },
            roam: Roam {
                auto: true,
                threshold_db: 40,
                allow_credential_fallback: false,
            },
            scan: Scan {
                interval: Duration::from_secs(1),
                ..Scan::default()
            },
            ap_names: ApNameDirectory::default(),
        }
        .clamp();

        assert_eq!(config.monitor.poll_interval, Duration::from_secs(1));
        assert_eq!(config.roam.threshold_db, 25);
        assert_eq!(config.scan.interval, Duration::from_secs(5));

        let low = Config {
            roam: Roam {
                threshold_db: 1,
                ..Roam::default()
            },
            ..Config::default()
        }
        .clamp();
        assert_eq!(low.roam.threshold_db, 5);
    }
}
