#![forbid(unsafe_code)]

use crate::error::Error;
use crate::model::Config;
use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load from a TOML file merged over the defaults. A missing file yields
    /// the defaults. Values are clamped into their valid ranges.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()?;
        Ok(config.clamp())
    }

    /// Write the full document back out. The engine persists write-through
    /// on every settings change, so this must not be lossy.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let doc = toml_edit::ser::to_string_pretty(self)?;
        fs::write(path, doc)?;
        Ok(())
    }
}

/// Opaque settings persistence as seen by the engine. The engine owns the
/// meaning of every value; the store only loads and saves the document.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Config, Error>;
    fn save(&self, config: &Config) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<Config, Error> {
        Config::load(&self.path)
    }

    fn save(&self, config: &Config) -> Result<(), Error> {
        config.save(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roamd.toml");

        let mut config = Config::default();
        config.roam.threshold_db = 15;
        config.monitor.poll_interval = Duration::from_secs(2);
        config.ap_names.set("aa:bb:cc:dd:ee:ff", "Attic");
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_clamps_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roamd.toml");
        fs::write(&path, "[roam]\nthreshold_db = 99\n[scan]\ninterval = 1\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.roam.threshold_db, 25);
        assert_eq!(loaded.scan.interval, Duration::from_secs(5));
    }

    #[test]
    fn store_trait_object_is_usable() {
        let dir = tempfile::tempdir().unwrap();
        let store: Box<dyn SettingsStore> =
            Box::new(TomlSettingsStore::new(dir.path().join("roamd.toml")));
        let mut config = store.load().unwrap();
        config.roam.auto = false;
        store.save(&config).unwrap();
        assert!(!store.load().unwrap().roam.auto);
    }
}
