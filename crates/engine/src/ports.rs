#![forbid(unsafe_code)]

use crate::domain::{AuthorizationStatus, Band, Bssid, ScannedNetwork};
use async_trait::async_trait;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RadioError {
    #[error("no wireless interface")]
    NoInterface,

    #[error("scan failed: {0}")]
    Scan(String),

    #[error("association failed: {0}")]
    Associate(String),

    #[error("radio command failed: {0}")]
    Command(String),
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("credential lookup failed: {0}")]
pub struct CredentialError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    Connected(LinkInfo),
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub rssi: i32,
    pub noise: i32,
    pub channel: u32,
    pub band: Band,
    /// `None` when the platform withholds the name (no scan permission).
    pub ssid: Option<String>,
    pub bssid: Option<Bssid>,
}

/// The platform radio. Scan and associate are slow, real-world calls; the
/// engine runs them on worker tasks and applies the results from its inbox.
#[async_trait]
pub trait RadioGateway: Send + Sync {
    async fn current_association(&self) -> Result<Association, RadioError>;

    /// Passive scan when `filter` is `None`; directed probe otherwise.
    async fn scan(&self, filter: Option<&str>) -> Result<Vec<ScannedNetwork>, RadioError>;

    async fn associate(
        &self,
        target: &ScannedNetwork,
        credential: Option<&str>,
    ) -> Result<(), RadioError>;

    fn scan_authorization(&self) -> AuthorizationStatus;

    /// Manual "restart radio" only; not part of the roam protocol.
    async fn set_radio_power(&self, on: bool) -> Result<(), RadioError>;
}

/// Saved network secrets. Consulted only when credential fallback is
/// explicitly enabled.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn lookup(&self, network: &str) -> Result<Option<String>, CredentialError>;
}
