#![forbid(unsafe_code)]

use crate::catalog::{ApCatalog, LiveContext};
use crate::clock::Clock;
use crate::command::Command;
use crate::decision;
use crate::domain::{AccessPoint, NetworkName, RoamEvent, ScannedNetwork, SignalSample};
use crate::error::Error;
use crate::history::{RoamLog, SignalHistory};
use crate::ports::{Association, CredentialStore, RadioError, RadioGateway};
use crate::roam::{self, RoamKind, RoamTarget, RoamTicket};
use crate::state::{ConnectionState, EngineSnapshot};
use config::{Config, SettingsStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Anti-oscillation backoff after every roam attempt, success or not.
const ROAM_COOLDOWN: Duration = Duration::from_secs(30);

/// Minimum spacing between weak-signal-triggered scans, and between such
/// a trigger and the previous completed scan.
const WEAK_SIGNAL_SCAN_COOLDOWN: Duration = Duration::from_secs(15);

/// Off-time in the middle of a manual radio restart.
const RADIO_RESTART_PAUSE: Duration = Duration::from_secs(2);

pub struct Services {
    pub radio: Arc<dyn RadioGateway>,
    pub credentials: Arc<dyn CredentialStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub clock: Arc<dyn Clock>,
}

/// Token for one dispatched scan. Carries the generation and the live
/// connection fields captured at dispatch; a completion whose generation
/// no longer matches is discarded.
#[derive(Debug, Clone)]
pub struct ScanTicket {
    generation: u64,
    live: LiveContext,
}

/// Worker completions marshaled back onto the engine task.
pub(crate) enum Completion {
    ScanFinished {
        ticket: ScanTicket,
        result: Result<Vec<ScannedNetwork>, RadioError>,
    },
    RoamFinished {
        ticket: RoamTicket,
        outcome: Result<(), Error>,
    },
    RadioRestartFinished(Result<(), RadioError>),
}

/// Cheap clonable front for the engine: command senders plus the snapshot
/// watch. This is all the presentation layer ever holds.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<EngineSnapshot>,
}

impl EngineHandle {
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshot.clone()
    }

    pub fn send(&self, command: Command) {
        let _ = self.commands.send(command);
    }

    pub fn set_monitoring_enabled(&self, enabled: bool) {
        self.send(Command::SetMonitoringEnabled(enabled));
    }

    pub fn set_auto_roam_enabled(&self, enabled: bool) {
        self.send(Command::SetAutoRoamEnabled(enabled));
    }

    pub fn manual_scan(&self) {
        self.send(Command::ManualScan);
    }

    pub fn manual_roam_to(&self, bssid: crate::domain::Bssid) {
        self.send(Command::ManualRoamTo(bssid));
    }

    pub fn manual_radio_restart(&self) {
        self.send(Command::ManualRadioRestart);
    }
}

/// The monitoring-and-decision engine. One logical task owns all mutable
/// state; timers, commands, and worker completions are serialized through
/// `run_until`.
pub struct RoamEngine {
    config: Config,
    services: Services,
    state: ConnectionState,
    catalog: ApCatalog,
    signal_history: SignalHistory,
    roam_log: RoamLog,
    /// Bumped whenever monitoring is disabled; in-flight scans from the
    /// previous session get discarded on arrival.
    generation: u64,
    paused: bool,
    /// Edge trigger: fire one scan as soon as name resolution starts
    /// working, reset when it stops.
    kicked_off_scan_after_access: bool,
    roam_cooldown_until: Option<Instant>,
    last_weak_scan_request: Option<Instant>,
    last_scan_started: Option<Instant>,
    next_poll: Instant,
    next_scan: Instant,
    commands_rx: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    snapshot_tx: watch::Sender<EngineSnapshot>,
}

impl RoamEngine {
    pub fn new(config: Config, services: Services) -> (Self, EngineHandle) {
        let config = config.clamp();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(EngineSnapshot::initial(&config));
        let now = services.clock.now();

        let engine = Self {
            config,
            services,
            state: ConnectionState::default(),
            catalog: ApCatalog::default(),
            signal_history: SignalHistory::default(),
            roam_log: RoamLog::default(),
            generation: 0,
            paused: false,
            kicked_off_scan_after_access: false,
            roam_cooldown_until: None,
            last_weak_scan_request: None,
            last_scan_started: None,
            next_poll: now,
            next_scan: now,
            commands_rx,
            completions_tx,
            completions_rx,
            snapshot_tx,
        };
        let handle = EngineHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
        };
        (engine, handle)
    }

    /// Build the engine from the settings store (load at construction,
    /// write-through afterwards).
    pub fn load(services: Services) -> Result<(Self, EngineHandle), Error> {
        let config = services.settings.load()?;
        Ok(Self::new(config, services))
    }

    /// Serialize timers, commands, and worker completions until cancelled.
    pub async fn run_until(&mut self, cancel: CancellationToken) -> Result<(), Error> {
        self.publish();
        loop {
            let now = self.services.clock.now();
            let timers_active = self.config.monitor.enabled && !self.paused;
            let poll_in = self.next_poll.saturating_duration_since(now);
            let scan_in = self.next_scan.saturating_duration_since(now);

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
                Some(command) = self.commands_rx.recv() => {
                    self.handle_command(command).await;
                }
                Some(completion) = self.completions_rx.recv() => {
                    self.apply_completion(completion).await;
                }
                _ = self.services.clock.sleep(poll_in), if timers_active => {
                    self.next_poll = self.services.clock.now() + self.config.monitor.poll_interval;
                    self.sample().await;
                }
                _ = self.services.clock.sleep(scan_in), if timers_active => {
                    self.next_scan = self.services.clock.now() + self.config.scan.interval;
                    self.dispatch_scan();
                }
            }
        }
        Ok(())
    }

    pub async fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetMonitoringEnabled(enabled) => {
                self.config.monitor.enabled = enabled;
                self.persist_settings();
                if enabled {
                    self.reset_deadlines();
                    self.sample().await;
                    self.dispatch_scan();
                } else {
                    self.generation = self.generation.wrapping_add(1);
                    debug!(generation = self.generation, "monitoring disabled");
                }
                self.publish();
            }
            Command::SetAutoRoamEnabled(enabled) => {
                self.config.roam.auto = enabled;
                self.persist_settings();
                self.publish();
            }
            Command::ManualScan => {
                self.dispatch_scan();
                self.publish();
            }
            Command::ManualRoamTo(bssid) => {
                let Some(ap) = self.catalog.by_bssid(&bssid).cloned() else {
                    warn!(%bssid, "manual roam target not in catalog");
                    return;
                };
                // Manual roams skip the cooldown but still respect the
                // single-flight guard inside begin_roam.
                self.roam_cooldown_until = None;
                self.spawn_roam(ap, RoamKind::Manual);
            }
            Command::ManualRadioRestart => self.spawn_radio_restart(),
            Command::SetFriendlyName { bssid, name } => {
                self.config.ap_names.set(bssid.as_str(), &name);
                self.persist_settings();
                self.publish();
            }
            Command::ApplyIntervals { poll, scan } => {
                self.config.monitor.poll_interval = poll;
                self.config.scan.interval = scan;
                self.config = self.config.clone().clamp();
                self.persist_settings();
                if self.config.monitor.enabled {
                    self.reset_deadlines();
                }
                self.publish();
            }
            Command::ReloadSettings => {
                match self.services.settings.load() {
                    Ok(config) => {
                        let was_enabled = self.config.monitor.enabled;
                        self.config = config;
                        if self.config.monitor.enabled {
                            self.reset_deadlines();
                            if !was_enabled {
                                self.sample().await;
                                self.dispatch_scan();
                            }
                        } else if was_enabled {
                            self.generation = self.generation.wrapping_add(1);
                        }
                        info!("settings reloaded");
                    }
                    Err(err) => {
                        warn!(%err, "settings reload failed; keeping current configuration");
                    }
                }
                self.publish();
            }
            Command::Pause => self.paused = true,
            Command::Resume => {
                self.paused = false;
                self.reset_deadlines();
            }
            Command::AuthorizationChanged(status) => {
                self.state.authorization = status;
                self.publish();
            }
        }
    }

    /// One poll tick: read the live association, update state and history,
    /// and run the opportunistic side effects.
    pub async fn sample(&mut self) {
        if !self.config.monitor.enabled {
            return;
        }
        self.state.last_check = Some(self.services.clock.now_system());
        self.state.authorization = self.services.radio.scan_authorization();

        let link = match self.services.radio.current_association().await {
            Ok(Association::Connected(link)) => link,
            Ok(Association::Disconnected) => {
                self.state.mark_disconnected();
                self.publish();
                return;
            }
            Err(err) => {
                // Transient read failures degrade to "disconnected"; the
                // next tick retries.
                warn!(%err, "radio read failed");
                self.state.mark_disconnected();
                self.publish();
                return;
            }
        };
        if link.rssi == 0 && link.channel == 0 {
            self.state.mark_disconnected();
            self.publish();
            return;
        }

        self.state.connected = true;
        self.state.rssi = link.rssi;
        self.state.noise = link.noise;
        if link.channel != 0 {
            self.state.channel = link.channel;
            self.state.band = link.band;
        }
        match link.ssid {
            Some(name) => {
                self.state.network = NetworkName::Resolved(name);
                self.state.has_name_access = true;
            }
            None => {
                self.state.has_name_access = false;
                self.kicked_off_scan_after_access = false;
                if !matches!(self.state.network, NetworkName::Resolved(_)) {
                    self.state.network = NetworkName::Synthetic(self.state.band);
                }
            }
        }
        if let Some(bssid) = link.bssid {
            self.state.bssid = Some(bssid);
        }

        let cap = SignalHistory::capacity(self.config.monitor.poll_interval);
        self.signal_history.push(
            SignalSample {
                at: self.services.clock.now_system(),
                rssi: self.state.rssi,
                noise: self.state.noise,
            },
            cap,
        );

        // Fire one scan the moment name resolution starts working instead
        // of waiting for the scan timer.
        if self.state.has_name_access && !self.kicked_off_scan_after_access {
            self.kicked_off_scan_after_access = true;
            self.dispatch_scan();
        }

        if self.config.scan.on_weak_signal
            && self.state.has_name_access
            && self.state.rssi <= self.config.scan.weak_signal_threshold_dbm
        {
            let now = self.services.clock.now();
            let trigger_ok = self
                .last_weak_scan_request
                .is_none_or(|at| now.duration_since(at) >= WEAK_SIGNAL_SCAN_COOLDOWN);
            let scan_ok = self
                .last_scan_started
                .is_none_or(|at| now.duration_since(at) >= WEAK_SIGNAL_SCAN_COOLDOWN);
            if trigger_ok && scan_ok {
                self.last_weak_scan_request = Some(now);
                self.dispatch_scan();
            }
        }

        self.catalog.patch_live(self.state.bssid.as_ref(), self.state.rssi);
        self.maybe_auto_roam();
        self.publish();
    }

    /// Check scan preconditions and hand out a ticket, or `None` when the
    /// scan must not run.
    pub fn begin_scan(&mut self) -> Option<ScanTicket> {
        if !self.config.monitor.enabled {
            return None;
        }
        if !(self.state.authorization.is_granted() || self.state.has_name_access) {
            return None;
        }
        self.state.last_scan = Some(self.services.clock.now_system());
        self.last_scan_started = Some(self.services.clock.now());
        Some(ScanTicket {
            generation: self.generation,
            live: self.live_context(),
        })
    }

    /// Apply a finished scan, unless it is from a stale session.
    pub fn apply_scan(
        &mut self,
        ticket: ScanTicket,
        result: Result<Vec<ScannedNetwork>, RadioError>,
    ) {
        if !self.config.monitor.enabled || ticket.generation != self.generation {
            debug!("discarding stale scan result");
            return;
        }
        match result {
            Err(err) => warn!(%err, "scan failed; keeping previous access point list"),
            Ok(networks) => {
                self.catalog
                    .ingest(networks, &ticket.live, self.services.clock.now_system());
                // Evaluate right away; a fresh scan may justify a roam the
                // stale pre-scan view didn't.
                self.maybe_auto_roam();
            }
        }
        self.publish();
    }

    /// Enter the roaming state: single-flight and self-roam guards, then
    /// cooldown extension and target capture. `None` when the roam is
    /// rejected.
    pub fn begin_roam(&mut self, ap: &AccessPoint, kind: RoamKind) -> Option<(RoamTicket, RoamTarget)> {
        if self.state.is_roaming {
            return None;
        }
        if ap.bssid.is_some() && ap.bssid == self.state.bssid {
            return None;
        }
        self.state.is_roaming = true;
        // Extended on entry regardless of outcome, so repeated failures
        // cannot retry-storm.
        self.roam_cooldown_until = Some(self.services.clock.now() + ROAM_COOLDOWN);

        let ticket = RoamTicket {
            kind,
            from: self.state.bssid.clone(),
            rssi_before: self.state.rssi,
            expected_to: ap.bssid.clone(),
        };
        let cached = ap
            .bssid
            .as_ref()
            .and_then(|bssid| self.catalog.cached(bssid))
            .cloned();
        let target = RoamTarget {
            ap: ap.clone(),
            cached,
            scan_filter: self.state.network.resolved().map(str::to_owned),
        };
        self.publish();
        Some((ticket, target))
    }

    /// Close out a roam: on success re-sample to learn the actual landing
    /// BSSID, suppress no-ops, log real moves, and trigger a fresh scan.
    pub async fn finish_roam(&mut self, ticket: RoamTicket, outcome: Result<(), Error>) {
        match outcome {
            Err(err) => {
                warn!(%err, kind = ?ticket.kind, "roam failed");
                self.state.is_roaming = false;
                self.publish();
            }
            Ok(()) => {
                // Still marked roaming here, so the re-sample cannot kick
                // off another roam mid-completion.
                self.sample().await;
                let actual = self.state.bssid.clone();
                if actual.is_some() && actual == ticket.from {
                    debug!("roam was a no-op; not recorded");
                    self.state.is_roaming = false;
                    self.publish();
                    return;
                }
                let event = RoamEvent {
                    at: self.services.clock.now_system(),
                    from: ticket.from,
                    to: actual.or(ticket.expected_to),
                    rssi_before: ticket.rssi_before,
                    rssi_after: self.state.rssi,
                };
                info!(
                    from = event.from.as_ref().map(|b| b.as_str()).unwrap_or("?"),
                    to = event.to.as_ref().map(|b| b.as_str()).unwrap_or("?"),
                    rssi_before = event.rssi_before,
                    rssi_after = event.rssi_after,
                    "roamed"
                );
                self.roam_log.record(event);
                self.dispatch_scan();
                self.state.is_roaming = false;
                self.publish();
            }
        }
    }

    /// Read-only accessors, mainly for tests.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn catalog(&self) -> &ApCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn roam_history(&self) -> Vec<RoamEvent> {
        self.roam_log.to_vec()
    }

    fn live_context(&self) -> LiveContext {
        LiveContext {
            network: self.state.network.clone(),
            bssid: self.state.bssid.clone(),
            channel: self.state.channel,
            rssi: self.state.rssi,
        }
    }

    fn reset_deadlines(&mut self) {
        let now = self.services.clock.now();
        self.next_poll = now + self.config.monitor.poll_interval;
        self.next_scan = now + self.config.scan.interval;
    }

    fn persist_settings(&self) {
        if let Err(err) = self.services.settings.save(&self.config) {
            warn!(%err, "failed to persist settings");
        }
    }

    fn maybe_auto_roam(&mut self) {
        if !(self.config.monitor.enabled
            && self.config.roam.auto
            && self.state.connected
            && !self.state.is_roaming)
        {
            return;
        }
        if let Some(until) = self.roam_cooldown_until
            && self.services.clock.now() < until
        {
            return;
        }
        let best = decision::better_candidates(
            self.catalog.aps(),
            &self.state.network,
            self.state.has_name_access,
            self.state.connected,
            self.state.rssi,
            self.config.roam.threshold_db,
        )
        .first()
        .map(|ap| (*ap).clone());
        if let Some(ap) = best {
            self.spawn_roam(ap, RoamKind::Auto);
        }
    }

    fn dispatch_scan(&mut self) {
        let Some(ticket) = self.begin_scan() else {
            return;
        };
        let radio = Arc::clone(&self.services.radio);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            // Always passive: directed probes are unreliable against APs
            // that silently ignore them.
            let result = radio.scan(None).await;
            let _ = tx.send(Completion::ScanFinished { ticket, result });
        });
    }

    fn spawn_roam(&mut self, ap: AccessPoint, kind: RoamKind) {
        let Some((ticket, target)) = self.begin_roam(&ap, kind) else {
            return;
        };
        let radio = Arc::clone(&self.services.radio);
        let credentials = Arc::clone(&self.services.credentials);
        let allow_fallback = self.config.roam.allow_credential_fallback;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome =
                roam::execute(radio.as_ref(), credentials.as_ref(), &target, allow_fallback).await;
            let _ = tx.send(Completion::RoamFinished { ticket, outcome });
        });
    }

    fn spawn_radio_restart(&self) {
        let radio = Arc::clone(&self.services.radio);
        let clock = Arc::clone(&self.services.clock);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = async {
                radio.set_radio_power(false).await?;
                clock.sleep(RADIO_RESTART_PAUSE).await;
                radio.set_radio_power(true).await
            }
            .await;
            let _ = tx.send(Completion::RadioRestartFinished(outcome));
        });
    }

    async fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::ScanFinished { ticket, result } => self.apply_scan(ticket, result),
            Completion::RoamFinished { ticket, outcome } => self.finish_roam(ticket, outcome).await,
            Completion::RadioRestartFinished(Ok(())) => info!("radio restarted"),
            Completion::RadioRestartFinished(Err(err)) => warn!(%err, "radio restart failed"),
        }
    }

    fn publish(&self) {
        let snapshot = EngineSnapshot {
            connection: self.state.clone(),
            config: self.config.clone(),
            access_points: self.catalog.aps().to_vec(),
            signal_history: self.signal_history.to_vec(),
            roam_history: self.roam_log.to_vec(),
            differential_db: self.catalog.differential(&self.live_context()),
            quality: self.state.quality(),
            snr: self.state.snr(),
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}
