mod radio;
mod secrets;

pub use radio::IwNmcliRadio;
pub use secrets::NmcliCredentialStore;
