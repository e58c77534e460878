#![forbid(unsafe_code)]

mod ap_names;
mod error;
mod model;
mod persistence;

pub use ap_names::{ApNameDirectory, MAX_AP_NAME_LEN};
pub use error::Error;
pub use model::{Config, Monitor, Roam, Scan};
pub use persistence::{SettingsStore, TomlSettingsStore};
