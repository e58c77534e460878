use async_trait::async_trait;
use engine::domain::{AuthorizationStatus, Band, Bssid, ScannedNetwork};
use engine::ports::{Association, LinkInfo, RadioError, RadioGateway};
use std::sync::Mutex;
use tokio::process::Command;
use tracing::debug;

/// Reported when the survey has no noise floor for the active channel.
const DEFAULT_NOISE_DBM: i32 = -95;

/// Radio backed by `iw` for reads and `nmcli` for writes. Reads parse the
/// plumbing-unfriendly human output; the parsers live as free functions so
/// they can be tested against captured output.
pub struct IwNmcliRadio {
    interface: Mutex<Option<String>>,
    authorization: Mutex<AuthorizationStatus>,
}

impl IwNmcliRadio {
    pub fn new(interface: Option<String>) -> Self {
        Self {
            interface: Mutex::new(interface),
            authorization: Mutex::new(AuthorizationStatus::Undetermined),
        }
    }

    async fn interface(&self) -> Result<String, RadioError> {
        if let Some(name) = self.interface.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone() {
            return Ok(name);
        }
        let out = run("iw", &["dev"]).await?;
        let name = parse_interfaces(&out)
            .into_iter()
            .next()
            .ok_or(RadioError::NoInterface)?;
        debug!(interface = %name, "auto-detected wireless interface");
        *self.interface.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(name.clone());
        Ok(name)
    }

    async fn noise(&self, interface: &str) -> i32 {
        match run("iw", &["dev", interface, "survey", "dump"]).await {
            Ok(out) => parse_survey_noise(&out).unwrap_or(DEFAULT_NOISE_DBM),
            Err(_) => DEFAULT_NOISE_DBM,
        }
    }

    fn note_scan_outcome(&self, outcome: &Result<String, RadioError>) {
        let mut authorization = self.authorization.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match outcome {
            Ok(_) => *authorization = AuthorizationStatus::Granted,
            Err(err) if format!("{err}").contains("Operation not permitted") => {
                *authorization = AuthorizationStatus::Denied;
            }
            Err(_) => {}
        }
    }
}

#[async_trait]
impl RadioGateway for IwNmcliRadio {
    async fn current_association(&self) -> Result<Association, RadioError> {
        let interface = self.interface().await?;
        let out = run("iw", &["dev", &interface, "link"]).await?;
        let Some(parts) = parse_link(&out) else {
            return Ok(Association::Disconnected);
        };
        let noise = self.noise(&interface).await;
        let channel = parts.freq.map(channel_from_frequency_mhz).unwrap_or(0);
        let band = parts.freq.map(Band::from_frequency_mhz).unwrap_or_default();
        Ok(Association::Connected(LinkInfo {
            rssi: parts.signal.unwrap_or(0),
            noise,
            channel,
            band,
            ssid: parts.ssid,
            bssid: parts.bssid,
        }))
    }

    async fn scan(&self, filter: Option<&str>) -> Result<Vec<ScannedNetwork>, RadioError> {
        let interface = self.interface().await?;
        let mut args = vec!["dev", interface.as_str(), "scan"];
        if let Some(ssid) = filter {
            args.extend(["ssid", ssid]);
        }
        let out = run("iw", &args).await;
        self.note_scan_outcome(&out);
        match out {
            Ok(text) => Ok(parse_scan(&text)),
            Err(err) => Err(RadioError::Scan(format!("{err}"))),
        }
    }

    async fn associate(
        &self,
        target: &ScannedNetwork,
        credential: Option<&str>,
    ) -> Result<(), RadioError> {
        let interface = self.interface().await?;
        let ssid = target
            .ssid
            .as_deref()
            .ok_or_else(|| RadioError::Associate("target has no SSID".to_owned()))?;
        let mut args = vec!["device", "wifi", "connect", ssid];
        if let Some(bssid) = &target.bssid {
            args.extend(["bssid", bssid.as_str()]);
        }
        args.extend(["ifname", interface.as_str()]);
        if let Some(secret) = credential {
            args.extend(["password", secret]);
        }
        run("nmcli", &args)
            .await
            .map(drop)
            .map_err(|err| RadioError::Associate(format!("{err}")))
    }

    fn scan_authorization(&self) -> AuthorizationStatus {
        *self.authorization.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn set_radio_power(&self, on: bool) -> Result<(), RadioError> {
        let state = if on { "on" } else { "off" };
        run("nmcli", &["radio", "wifi", state]).await.map(drop)
    }
}

async fn run(program: &str, args: &[&str]) -> Result<String, RadioError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|err| RadioError::Command(format!("{program}: {err}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RadioError::Command(format!(
            "{program} failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct LinkParts {
    bssid: Option<Bssid>,
    ssid: Option<String>,
    freq: Option<u32>,
    signal: Option<i32>,
}

/// Parse `iw dev <ifc> link`. `None` means not associated.
fn parse_link(out: &str) -> Option<LinkParts> {
    let mut parts = LinkParts::default();
    let mut connected = false;
    for line in out.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Connected to ") {
            connected = true;
            parts.bssid = rest.split_whitespace().next().map(Bssid::new);
        } else if let Some(rest) = line.strip_prefix("SSID: ") {
            parts.ssid = clean_ssid(rest);
        } else if let Some(rest) = line.strip_prefix("freq: ") {
            parts.freq = parse_leading_u32(rest);
        } else if let Some(rest) = line.strip_prefix("signal: ") {
            parts.signal = parse_leading_i32(rest);
        }
    }
    connected.then_some(parts)
}

/// Parse `iw dev <ifc> scan` into raw rows, one per BSS block.
fn parse_scan(out: &str) -> Vec<ScannedNetwork> {
    let mut networks = Vec::new();
    let mut current: Option<ScannedNetwork> = None;
    for line in out.lines() {
        if let Some(rest) = line.strip_prefix("BSS ") {
            if let Some(done) = current.take() {
                networks.push(done);
            }
            let bssid = rest
                .split(|c: char| c == '(' || c.is_whitespace())
                .next()
                .filter(|s| !s.is_empty())
                .map(Bssid::new);
            current = Some(ScannedNetwork {
                ssid: None,
                bssid,
                rssi: 0,
                channel: 0,
                band: Band::Unknown,
            });
            continue;
        }
        let Some(network) = current.as_mut() else {
            continue;
        };
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("freq: ") {
            if let Some(freq) = parse_leading_u32(rest) {
                network.channel = channel_from_frequency_mhz(freq);
                network.band = Band::from_frequency_mhz(freq);
            }
        } else if let Some(rest) = trimmed.strip_prefix("signal: ") {
            network.rssi = parse_leading_i32(rest).unwrap_or(0);
        } else if let Some(rest) = trimmed.strip_prefix("SSID: ") {
            network.ssid = clean_ssid(rest);
        }
    }
    if let Some(done) = current.take() {
        networks.push(done);
    }
    networks
}

/// Noise floor of the in-use channel from `iw dev <ifc> survey dump`.
fn parse_survey_noise(out: &str) -> Option<i32> {
    let mut in_use = false;
    for line in out.lines() {
        let line = line.trim();
        if line.starts_with("frequency:") {
            in_use = line.contains("[in use]");
        } else if in_use && let Some(rest) = line.strip_prefix("noise:") {
            return parse_leading_i32(rest.trim());
        }
    }
    None
}

/// Interface names from `iw dev`, in listing order.
fn parse_interfaces(out: &str) -> Vec<String> {
    out.lines()
        .filter_map(|line| line.trim().strip_prefix("Interface "))
        .map(str::to_owned)
        .collect()
}

fn channel_from_frequency_mhz(freq: u32) -> u32 {
    match freq {
        2412..=2472 => (freq - 2407) / 5,
        2484 => 14,
        5000..=5895 => (freq - 5000) / 5,
        5955..=7115 => (freq - 5950) / 5,
        _ => 0,
    }
}

/// Hidden networks advertise an empty or all-NUL SSID.
fn clean_ssid(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.replace("\\x00", "").is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn parse_leading_u32(raw: &str) -> Option<u32> {
    let token = raw.split_whitespace().next()?;
    token.split('.').next()?.parse().ok()
}

fn parse_leading_i32(raw: &str) -> Option<i32> {
    let token = raw.split_whitespace().next()?;
    token.split('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINK_CONNECTED: &str = "\
Connected to d8:0d:17:2a:3b:4c (on wlan0)
	SSID: lab
	freq: 5180
	RX: 107225887 bytes (78583 packets)
	TX: 7205424 bytes (31960 packets)
	signal: -58 dBm
	rx bitrate: 433.3 MBit/s
	tx bitrate: 433.3 MBit/s
";

    const SCAN_OUTPUT: &str = "\
BSS d8:0d:17:2a:3b:4c(on wlan0) -- associated
	last seen: 123.456s [boottime]
	freq: 5180
	signal: -58.00 dBm
	SSID: lab
BSS d8:0d:17:2a:3b:4d(on wlan0)
	freq: 2437
	signal: -44.00 dBm
	SSID: lab
BSS aa:bb:cc:00:11:22(on wlan0)
	freq: 2412
	signal: -71.00 dBm
	SSID: \\x00\\x00\\x00
";

    const SURVEY_OUTPUT: &str = "\
Survey data from wlan0
	frequency:			2412 MHz
	noise:				-89 dBm
Survey data from wlan0
	frequency:			5180 MHz [in use]
	noise:				-95 dBm
	channel active time:		1000 ms
";

    const IW_DEV_OUTPUT: &str = "\
phy#0
	Interface wlan0
		ifindex 3
		wdev 0x1
		addr 11:22:33:44:55:66
		type managed
";

    #[test]
    fn parses_a_connected_link() {
        let parts = parse_link(LINK_CONNECTED).unwrap();
        assert_eq!(
            parts,
            LinkParts {
                bssid: Some(Bssid::new("d8:0d:17:2a:3b:4c")),
                ssid: Some("lab".to_owned()),
                freq: Some(5180),
                signal: Some(-58),
            }
        );
    }

    #[test]
    fn unassociated_link_is_none() {
        assert_eq!(parse_link("Not connected.\n"), None);
    }

    #[test]
    fn parses_scan_blocks() {
        let networks = parse_scan(SCAN_OUTPUT);
        assert_eq!(networks.len(), 3);
        assert_eq!(networks[0].bssid, Some(Bssid::new("d8:0d:17:2a:3b:4c")));
        assert_eq!(networks[0].ssid, Some("lab".to_owned()));
        assert_eq!(networks[0].rssi, -58);
        assert_eq!(networks[0].channel, 36);
        assert_eq!(networks[0].band, Band::FiveGhz);
        assert_eq!(networks[1].channel, 6);
        assert_eq!(networks[1].band, Band::TwoPointFourGhz);
        // Hidden SSID comes through as None.
        assert_eq!(networks[2].ssid, None);
        assert_eq!(networks[2].rssi, -71);
    }

    #[test]
    fn survey_noise_comes_from_the_in_use_channel() {
        assert_eq!(parse_survey_noise(SURVEY_OUTPUT), Some(-95));
        assert_eq!(parse_survey_noise("Survey data from wlan0\n"), None);
    }

    #[test]
    fn lists_interfaces() {
        assert_eq!(parse_interfaces(IW_DEV_OUTPUT), vec!["wlan0".to_owned()]);
        assert!(parse_interfaces("phy#0\n").is_empty());
    }

    #[test]
    fn maps_frequencies_to_channels() {
        assert_eq!(channel_from_frequency_mhz(2412), 1);
        assert_eq!(channel_from_frequency_mhz(2437), 6);
        assert_eq!(channel_from_frequency_mhz(2484), 14);
        assert_eq!(channel_from_frequency_mhz(5180), 36);
        assert_eq!(channel_from_frequency_mhz(5745), 149);
        assert_eq!(channel_from_frequency_mhz(5955), 1);
        assert_eq!(channel_from_frequency_mhz(900), 0);
    }
}
