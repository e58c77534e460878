use async_trait::async_trait;
use engine::ports::{CredentialError, CredentialStore};
use tokio::process::Command;
use tracing::debug;

/// Saved PSKs through NetworkManager's connection store. A connection
/// profile that does not exist, or has no stored secret, yields `None`.
#[derive(Debug, Default)]
pub struct NmcliCredentialStore;

#[async_trait]
impl CredentialStore for NmcliCredentialStore {
    async fn lookup(&self, network: &str) -> Result<Option<String>, CredentialError> {
        let output = Command::new("nmcli")
            .args([
                "-s",
                "-g",
                "802-11-wireless-security.psk",
                "connection",
                "show",
                network,
            ])
            .output()
            .await
            .map_err(|err| CredentialError(format!("nmcli: {err}")))?;
        if !output.status.success() {
            debug!(%network, "no connection profile for network");
            return Ok(None);
        }
        let secret = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        Ok((!secret.is_empty()).then_some(secret))
    }
}
