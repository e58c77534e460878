use crate::error::Error;
use flume::Sender;
use tokio::signal::unix::{SignalKind, signal};

/// Indefinitely listens to signals and sends signal events to the provided channel.
pub async fn wait_for_signal(signal_event: &Sender<SignalEvent>) -> Result<(), Error> {
    let mut sigusr1 = signal(SignalKind::user_defined1()).map_err(Error::SignalHandler)?;
    let mut sigusr2 = signal(SignalKind::user_defined2()).map_err(Error::SignalHandler)?;
    let mut sighup = signal(SignalKind::hangup()).map_err(Error::SignalHandler)?;

    loop {
        tokio::select! {
            _ = sigusr1.recv() => {
                signal_event.send_async(SignalEvent::Rescan).await?;
            }
            _ = sigusr2.recv() => {
                signal_event.send_async(SignalEvent::ToggleMonitoring).await?;
            }
            _ = sighup.recv() => {
                signal_event.send_async(SignalEvent::ReloadSettings).await?;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SignalEvent {
    /// SIGUSR1: kick off a scan right now.
    Rescan,
    /// SIGUSR2: flip the master monitoring switch.
    ToggleMonitoring,
    /// SIGHUP: re-read the settings file.
    ReloadSettings,
}
