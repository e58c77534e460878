#![forbid(unsafe_code)]

use crate::ports::{CredentialError, RadioError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("settings error: {0}")]
    Settings(#[from] config::Error),

    #[error(transparent)]
    Radio(#[from] RadioError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("target access point not found in scan results")]
    TargetVanished,
}
