#![allow(dead_code)]

use async_trait::async_trait;
use config::{Config, SettingsStore};
use engine::Services;
use engine::clock::Clock;
use engine::domain::{AuthorizationStatus, Band, Bssid, ScannedNetwork};
use engine::ports::{
    Association, CredentialError, CredentialStore, LinkInfo, RadioError, RadioGateway,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

/// Scriptable radio double. Scan results and associate outcomes are
/// consumed front-to-back; the link reading is sticky until replaced.
#[derive(Debug)]
pub struct MockRadio {
    link: Mutex<Result<Association, RadioError>>,
    scan_results: Mutex<VecDeque<Result<Vec<ScannedNetwork>, RadioError>>>,
    associate_outcomes: Mutex<VecDeque<Result<(), RadioError>>>,
    pub associate_calls: Mutex<Vec<(ScannedNetwork, Option<String>)>>,
    pub scan_calls: Mutex<Vec<Option<String>>>,
    pub power_calls: Mutex<Vec<bool>>,
    authorization: Mutex<AuthorizationStatus>,
}

impl Default for MockRadio {
    fn default() -> Self {
        Self {
            link: Mutex::new(Ok(Association::Disconnected)),
            scan_results: Mutex::new(VecDeque::new()),
            associate_outcomes: Mutex::new(VecDeque::new()),
            associate_calls: Mutex::new(Vec::new()),
            scan_calls: Mutex::new(Vec::new()),
            power_calls: Mutex::new(Vec::new()),
            authorization: Mutex::new(AuthorizationStatus::Granted),
        }
    }
}

impl MockRadio {
    pub fn set_link(&self, link: LinkInfo) {
        *self.link.lock().unwrap() = Ok(Association::Connected(link));
    }

    pub fn set_disconnected(&self) {
        *self.link.lock().unwrap() = Ok(Association::Disconnected);
    }

    pub fn set_link_error(&self, err: RadioError) {
        *self.link.lock().unwrap() = Err(err);
    }

    pub fn push_scan_result(&self, result: Result<Vec<ScannedNetwork>, RadioError>) {
        self.scan_results.lock().unwrap().push_back(result);
    }

    pub fn push_associate_outcome(&self, outcome: Result<(), RadioError>) {
        self.associate_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn set_authorization(&self, status: AuthorizationStatus) {
        *self.authorization.lock().unwrap() = status;
    }
}

#[async_trait]
impl RadioGateway for MockRadio {
    async fn current_association(&self) -> Result<Association, RadioError> {
        self.link.lock().unwrap().clone()
    }

    async fn scan(&self, filter: Option<&str>) -> Result<Vec<ScannedNetwork>, RadioError> {
        self.scan_calls
            .lock()
            .unwrap()
            .push(filter.map(str::to_owned));
        self.scan_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn associate(
        &self,
        target: &ScannedNetwork,
        credential: Option<&str>,
    ) -> Result<(), RadioError> {
        self.associate_calls
            .lock()
            .unwrap()
            .push((target.clone(), credential.map(str::to_owned)));
        self.associate_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn scan_authorization(&self) -> AuthorizationStatus {
        *self.authorization.lock().unwrap()
    }

    async fn set_radio_power(&self, on: bool) -> Result<(), RadioError> {
        self.power_calls.lock().unwrap().push(on);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockCredentials {
    secrets: Mutex<HashMap<String, String>>,
    fail: Mutex<bool>,
    pub lookups: Mutex<Vec<String>>,
}

impl MockCredentials {
    pub fn insert(&self, network: &str, secret: &str) {
        self.secrets
            .lock()
            .unwrap()
            .insert(network.to_owned(), secret.to_owned());
    }

    pub fn fail_lookups(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl CredentialStore for MockCredentials {
    async fn lookup(&self, network: &str) -> Result<Option<String>, CredentialError> {
        self.lookups.lock().unwrap().push(network.to_owned());
        if *self.fail.lock().unwrap() {
            return Err(CredentialError("store unavailable".to_owned()));
        }
        Ok(self.secrets.lock().unwrap().get(network).cloned())
    }
}

#[derive(Debug)]
pub struct MemorySettings {
    config: Mutex<Config>,
    pub saved: Mutex<Vec<Config>>,
}

impl MemorySettings {
    pub fn new(config: Config) -> Self {
        Self {
            config: Mutex::new(config),
            saved: Mutex::new(Vec::new()),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> Result<Config, config::Error> {
        Ok(self.config.lock().unwrap().clone())
    }

    fn save(&self, config: &Config) -> Result<(), config::Error> {
        *self.config.lock().unwrap() = config.clone();
        self.saved.lock().unwrap().push(config.clone());
        Ok(())
    }
}

/// Clock whose reading only moves when a test advances it. `sleep` returns
/// immediately; the tests drive the engine by calling its methods, not by
/// running the timer loop.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    start_system: SystemTime,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            start_system: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            offset: Mutex::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }

    fn now_system(&self) -> SystemTime {
        self.start_system + *self.offset.lock().unwrap()
    }

    async fn sleep(&self, _duration: Duration) {}
}

pub struct Harness {
    pub radio: Arc<MockRadio>,
    pub credentials: Arc<MockCredentials>,
    pub settings: Arc<MemorySettings>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self {
            radio: Arc::new(MockRadio::default()),
            credentials: Arc::new(MockCredentials::default()),
            settings: Arc::new(MemorySettings::new(config)),
            clock: Arc::new(ManualClock::default()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            radio: Arc::clone(&self.radio) as _,
            credentials: Arc::clone(&self.credentials) as _,
            settings: Arc::clone(&self.settings) as _,
            clock: Arc::clone(&self.clock) as _,
        }
    }
}

pub fn link(ssid: Option<&str>, bssid: Option<&str>, rssi: i32, channel: u32) -> LinkInfo {
    LinkInfo {
        rssi,
        noise: -92,
        channel,
        band: Band::from_channel(channel, false),
        ssid: ssid.map(str::to_owned),
        bssid: bssid.map(Bssid::new),
    }
}

pub fn scanned(ssid: &str, bssid: &str, rssi: i32, channel: u32) -> ScannedNetwork {
    ScannedNetwork {
        ssid: Some(ssid.to_owned()),
        bssid: Some(Bssid::new(bssid)),
        rssi,
        channel,
        band: Band::from_channel(channel, false),
    }
}
