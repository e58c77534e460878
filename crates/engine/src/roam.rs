#![forbid(unsafe_code)]

use crate::domain::{AccessPoint, Bssid, ScannedNetwork};
use crate::error::Error;
use crate::ports::{CredentialStore, RadioGateway};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoamKind {
    Auto,
    Manual,
}

/// Everything the association worker needs, captured on the engine task
/// before dispatch.
#[derive(Debug, Clone)]
pub struct RoamTarget {
    pub ap: AccessPoint,
    /// Descriptor from the most recent scan, when the target's BSSID was
    /// seen there. Saves a re-scan.
    pub cached: Option<ScannedNetwork>,
    /// Directed re-scan filter when no cached descriptor exists. `None`
    /// falls back to a passive scan.
    pub scan_filter: Option<String>,
}

/// One in-flight roam. The engine hands this out when entering the
/// roaming state and closes it out when the worker reports back.
#[derive(Debug, Clone)]
pub struct RoamTicket {
    pub kind: RoamKind,
    pub from: Option<Bssid>,
    pub rssi_before: i32,
    pub expected_to: Option<Bssid>,
}

/// The association protocol: locate the target, try a passwordless
/// association, and only if that fails and fallback is explicitly enabled
/// retry once with a saved credential. The original failure is what gets
/// reported when no fallback applies.
pub async fn execute(
    radio: &dyn RadioGateway,
    credentials: &dyn CredentialStore,
    target: &RoamTarget,
    allow_credential_fallback: bool,
) -> Result<(), Error> {
    let descriptor = match &target.cached {
        Some(network) => network.clone(),
        None => relocate(radio, target).await?,
    };

    let first_failure = match radio.associate(&descriptor, None).await {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    if !allow_credential_fallback {
        return Err(first_failure.into());
    }
    let Some(network) = descriptor
        .ssid
        .as_deref()
        .or(target.scan_filter.as_deref())
    else {
        return Err(first_failure.into());
    };
    match credentials.lookup(network).await {
        Ok(Some(secret)) => radio
            .associate(&descriptor, Some(&secret))
            .await
            .map_err(Into::into),
        Ok(None) => Err(first_failure.into()),
        Err(err) => {
            warn!(%err, "credential lookup failed; reporting original association failure");
            Err(first_failure.into())
        }
    }
}

async fn relocate(radio: &dyn RadioGateway, target: &RoamTarget) -> Result<ScannedNetwork, Error> {
    let networks = radio.scan(target.scan_filter.as_deref()).await?;
    networks
        .into_iter()
        .find(|n| match &target.ap.bssid {
            Some(bssid) => n.bssid.as_ref() == Some(bssid),
            // Known approximation: channel plus exact RSSI.
            None => n.channel == target.ap.channel && n.rssi == target.ap.rssi,
        })
        .ok_or(Error::TargetVanished)
}
