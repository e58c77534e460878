#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Friendly names are capped so a pathological settings file cannot blow up
/// the published snapshot.
pub const MAX_AP_NAME_LEN: usize = 64;

/// User-assigned display names keyed by BSSID. Absence means "no friendly
/// name"; setting an empty name removes the entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApNameDirectory {
    names: BTreeMap<String, String>,
}

impl ApNameDirectory {
    pub fn get(&self, bssid: &str) -> Option<&str> {
        self.names.get(bssid).map(String::as_str)
    }

    pub fn set(&mut self, bssid: &str, name: &str) {
        let trimmed: String = name.trim().chars().take(MAX_AP_NAME_LEN).collect();
        if trimmed.is_empty() {
            self.names.remove(bssid);
        } else {
            self.names.insert(bssid.to_owned(), trimmed);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Short display token for a BSSID: the friendly name's first `limit`
    /// characters uppercased, else the last four hex digits of the BSSID.
    pub fn token(&self, bssid: &str, limit: usize) -> String {
        let limit = limit.max(1);
        if let Some(name) = self.get(bssid) {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                return trimmed.chars().take(limit).collect::<String>().to_uppercase();
            }
        }
        if bssid.is_empty() {
            return "--".to_owned();
        }
        let cleaned: String = bssid.chars().filter(|c| *c != ':').collect();
        let start = cleaned.len().saturating_sub(limit.min(4));
        cleaned[start..].to_uppercase()
    }
}
