use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// roamd: Wi-Fi roam monitoring daemon
///
/// roamd watches the live Wi-Fi association, scans for neighboring access
/// points on the same network, and re-associates to a materially stronger
/// one. SIGUSR1 triggers an immediate scan; SIGUSR2 toggles monitoring.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub(crate) struct Cli {
    /// Path to configuration file.
    ///
    /// Defaults to $XDG_CONFIG_HOME/roamd/config.toml. The file is created
    /// on the first settings change.
    #[arg(short, long, value_parser = validate_file)]
    pub(crate) conffile: Option<PathBuf>,

    /// Wireless interface to monitor.
    ///
    /// Auto-detected when omitted.
    #[arg(short, long)]
    pub(crate) interface: Option<String>,

    #[command(flatten)]
    pub(crate) verbosity: Verbosity<WarnLevel>,
}

/// Default settings location, honoring XDG.
pub(crate) fn default_config_path() -> PathBuf {
    if let Some(base) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(base).join("roamd").join("config.toml");
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("roamd")
            .join("config.toml");
    }
    PathBuf::from("roamd.toml")
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}
