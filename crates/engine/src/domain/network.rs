#![forbid(unsafe_code)]

use std::fmt;

/// Hardware address of one access point. Normalized to lowercase so the
/// same radio reported by different tools compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bssid(String);

impl Bssid {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Band {
    TwoPointFourGhz,
    FiveGhz,
    SixGhz,
    #[default]
    Unknown,
}

impl Band {
    /// Band from a channel number. 36-177 is ambiguous between 5 GHz and
    /// 6 GHz; `six_ghz` is the radio's own report when it has one.
    pub fn from_channel(channel: u32, six_ghz: bool) -> Self {
        match channel {
            1..=14 => Self::TwoPointFourGhz,
            36..=177 if six_ghz => Self::SixGhz,
            36..=177 => Self::FiveGhz,
            _ => Self::Unknown,
        }
    }

    pub fn from_frequency_mhz(freq: u32) -> Self {
        match freq {
            2400..=2500 => Self::TwoPointFourGhz,
            4900..=5899 => Self::FiveGhz,
            5925..=7125 => Self::SixGhz,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TwoPointFourGhz => "2.4GHz",
            Self::FiveGhz => "5GHz",
            Self::SixGhz => "6GHz",
            Self::Unknown => "?",
        }
    }
}

/// The live network name. Only a `Resolved` name may feed the roam
/// decision; the synthetic band-derived placeholder exists for display
/// when the platform withholds the SSID.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NetworkName {
    Resolved(String),
    Synthetic(Band),
    #[default]
    Unknown,
}

impl NetworkName {
    pub fn resolved(&self) -> Option<&str> {
        match self {
            Self::Resolved(name) => Some(name),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Resolved(name) => name.clone(),
            Self::Synthetic(band) => format!("WiFi ({})", band.label()),
            Self::Unknown => "Unknown".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl AuthorizationStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}
