mod adapters;
mod cli;
mod error;
mod signals;

use crate::adapters::{IwNmcliRadio, NmcliCredentialStore};
use crate::cli::{Cli, default_config_path};
use crate::signals::{SignalEvent, wait_for_signal};
use clap::Parser;
use config::TomlSettingsStore;
use engine::clock::SystemClock;
use engine::{RoamEngine, Services};
use flume::bounded;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_log::AsTrace;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.log_level_filter().as_trace())
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!(config = ?cli);

    let settings_path = cli.conffile.clone().unwrap_or_else(default_config_path);
    info!(path = %settings_path.display(), "loading settings");

    let services = Services {
        radio: Arc::new(IwNmcliRadio::new(cli.interface.clone())),
        credentials: Arc::new(NmcliCredentialStore),
        settings: Arc::new(TomlSettingsStore::new(settings_path)),
        clock: Arc::new(SystemClock),
    };
    let (mut engine, handle) = RoamEngine::load(services)?;

    let cancel = CancellationToken::new();
    let engine_cancel = cancel.clone();
    let engine_task = tokio::spawn(async move { engine.run_until(engine_cancel).await });

    let (events_tx, events_rx) = bounded(8);
    let signal_task = tokio::spawn(async move { wait_for_signal(&events_tx).await });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; shutting down");
                cancel.cancel();
                break;
            }
            res = events_rx.recv_async() => {
                match res? {
                    SignalEvent::Rescan => {
                        info!("scan requested via SIGUSR1");
                        handle.manual_scan();
                    }
                    SignalEvent::ToggleMonitoring => {
                        let enabled = !handle.snapshot().config.monitor.enabled;
                        info!(enabled, "monitoring toggled via SIGUSR2");
                        handle.set_monitoring_enabled(enabled);
                    }
                    SignalEvent::ReloadSettings => {
                        info!("settings reload requested via SIGHUP");
                        handle.send(engine::Command::ReloadSettings);
                    }
                }
            }
        }
    }

    signal_task.abort();
    engine_task.await??;
    Ok(())
}
