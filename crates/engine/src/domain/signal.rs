#![forbid(unsafe_code)]

use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSample {
    pub at: SystemTime,
    pub rssi: i32,
    pub noise: i32,
}

impl SignalSample {
    pub fn snr(&self) -> i32 {
        self.rssi - self.noise
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignalQuality {
    Disconnected,
    VeryWeak,
    Weak,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl SignalQuality {
    pub fn from_rssi(connected: bool, rssi: i32) -> Self {
        if !connected {
            return Self::Disconnected;
        }
        match rssi {
            -30..=0 => Self::Excellent,
            -50..=-31 => Self::VeryGood,
            -60..=-51 => Self::Good,
            -70..=-61 => Self::Fair,
            -80..=-71 => Self::Weak,
            _ => Self::VeryWeak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::VeryGood => "Very Good",
            Self::Excellent => "Excellent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_tiers() {
        assert_eq!(SignalQuality::from_rssi(false, -40), SignalQuality::Disconnected);
        assert_eq!(SignalQuality::from_rssi(true, -25), SignalQuality::Excellent);
        assert_eq!(SignalQuality::from_rssi(true, -45), SignalQuality::VeryGood);
        assert_eq!(SignalQuality::from_rssi(true, -55), SignalQuality::Good);
        assert_eq!(SignalQuality::from_rssi(true, -65), SignalQuality::Fair);
        assert_eq!(SignalQuality::from_rssi(true, -75), SignalQuality::Weak);
        assert_eq!(SignalQuality::from_rssi(true, -88), SignalQuality::VeryWeak);
    }

    #[test]
    fn snr_is_rssi_minus_noise() {
        let sample = SignalSample {
            at: SystemTime::UNIX_EPOCH,
            rssi: -60,
            noise: -92,
        };
        assert_eq!(sample.snr(), 32);
    }
}
