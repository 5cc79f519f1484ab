use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use survey_gps::nmea::DEFAULT_MIN_CONSECUTIVE;
use survey_gps::DEFAULT_MAX_ATTEMPTS;
use survey_session::LogMode;
use survey_speed::SpeedtestConfig;

pub const DEFAULT_GPSD_ADDRESS: &str = "127.0.0.1:2947";
pub const DEFAULT_NMEA_ADDRESS: &str = "127.0.0.1:4352";
pub const DEFAULT_ADB_PORT: u16 = 4352;
pub const DEFAULT_TARGET_SSID: &str = "eduroam";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    #[default]
    Gpsd,
    Nmea,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub trials: usize,
    pub trial_pause_ms: u64,
    pub log_dir: PathBuf,
    pub log_mode: LogMode,
    pub user: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            trials: 3,
            trial_pause_ms: 1000,
            log_dir: PathBuf::from("."),
            log_mode: LogMode::Strict,
            user: default_user(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositionSettings {
    pub source: PositionSource,
    pub address: Option<String>,
    pub max_attempts: usize,
    pub min_consecutive: usize,
    pub read_timeout_ms: u64,
    /// 0 disables the `adb forward` check.
    pub adb_port: u16,
    /// Empty disables the process check.
    pub daemon_pattern: String,
}

impl PositionSettings {
    pub fn address(&self) -> String {
        match (&self.address, self.source) {
            (Some(address), _) => address.clone(),
            (None, PositionSource::Gpsd) => DEFAULT_GPSD_ADDRESS.to_string(),
            (None, PositionSource::Nmea) => DEFAULT_NMEA_ADDRESS.to_string(),
        }
    }
}

impl Default for PositionSettings {
    fn default() -> Self {
        PositionSettings {
            source: PositionSource::Gpsd,
            address: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_consecutive: DEFAULT_MIN_CONSECUTIVE,
            read_timeout_ms: 2000,
            adb_port: DEFAULT_ADB_PORT,
            daemon_pattern: "gpsd tcp".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReachabilitySettings {
    pub address: String,
    pub timeout_ms: u64,
}

impl Default for ReachabilitySettings {
    fn default() -> Self {
        ReachabilitySettings {
            address: survey_speed::reachability::DEFAULT_PROBE_ADDRESS.to_string(),
            timeout_ms: 3000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub session: SessionSettings,
    pub position: PositionSettings,
    pub target_ssid: String,
    pub throughput: SpeedtestConfig,
    pub reachability: ReachabilitySettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            session: SessionSettings::default(),
            position: PositionSettings::default(),
            target_ssid: DEFAULT_TARGET_SSID.to_string(),
            throughput: SpeedtestConfig::default(),
            reachability: ReachabilitySettings::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionPartial {
    trials: Option<usize>,
    trial_pause_ms: Option<u64>,
    log_dir: Option<PathBuf>,
    log_mode: Option<LogMode>,
    user: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PositionPartial {
    source: Option<PositionSource>,
    address: Option<String>,
    max_attempts: Option<usize>,
    min_consecutive: Option<usize>,
    read_timeout_ms: Option<u64>,
    adb_port: Option<u16>,
    daemon_pattern: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScanPartial {
    target_ssid: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ThroughputPartial {
    server_list_url: Option<String>,
    download_sizes: Option<Vec<u32>>,
    upload_sizes: Option<Vec<usize>>,
    timeout_ms: Option<u64>,
    latency_probes: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ReachabilityPartial {
    address: Option<String>,
    timeout_ms: Option<u64>,
}

/// `$USER`, or "unknown" when it is not set.
pub fn default_user() -> String {
    std::env::var("USER")
        .ok()
        .filter(|user| !user.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Loads configuration from the given TOML file path.
pub fn load_config(path: &str) -> Result<Config, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    parse_config(&s)
}

/// Sections and keys left out keep their defaults.
pub fn parse_config(s: &str) -> Result<Config, Box<dyn Error>> {
    let val: toml::Value = toml::from_str(s)?;
    let table = val.as_table().ok_or("config is not a table")?;

    let mut config = Config::default();

    if let Some(v) = table.get("session") {
        let partial: SessionPartial = v.clone().try_into()?;
        let d = &mut config.session;
        if let Some(x) = partial.trials { d.trials = x; }
        if let Some(x) = partial.trial_pause_ms { d.trial_pause_ms = x; }
        if let Some(x) = partial.log_dir { d.log_dir = x; }
        if let Some(x) = partial.log_mode { d.log_mode = x; }
        if let Some(x) = partial.user { d.user = x; }
    }

    if let Some(v) = table.get("position") {
        let partial: PositionPartial = v.clone().try_into()?;
        let d = &mut config.position;
        if let Some(x) = partial.source { d.source = x; }
        if let Some(x) = partial.address { d.address = Some(x); }
        if let Some(x) = partial.max_attempts { d.max_attempts = x; }
        if let Some(x) = partial.min_consecutive { d.min_consecutive = x; }
        if let Some(x) = partial.read_timeout_ms { d.read_timeout_ms = x; }
        if let Some(x) = partial.adb_port { d.adb_port = x; }
        if let Some(x) = partial.daemon_pattern { d.daemon_pattern = x; }
    }

    if let Some(v) = table.get("scan") {
        let partial: ScanPartial = v.clone().try_into()?;
        if let Some(x) = partial.target_ssid { config.target_ssid = x; }
    }

    if let Some(v) = table.get("throughput") {
        let partial: ThroughputPartial = v.clone().try_into()?;
        let d = &mut config.throughput;
        if let Some(x) = partial.server_list_url { d.server_list_url = x; }
        if let Some(x) = partial.download_sizes { d.download_sizes = x; }
        if let Some(x) = partial.upload_sizes { d.upload_sizes = x; }
        if let Some(x) = partial.timeout_ms { d.timeout = Duration::from_millis(x); }
        if let Some(x) = partial.latency_probes { d.latency_probes = x; }
    }

    if let Some(v) = table.get("reachability") {
        let partial: ReachabilityPartial = v.clone().try_into()?;
        let d = &mut config.reachability;
        if let Some(x) = partial.address { d.address = x; }
        if let Some(x) = partial.timeout_ms { d.timeout_ms = x; }
    }

    if config.throughput.download_sizes.is_empty() || config.throughput.upload_sizes.is_empty() {
        return Err("throughput transfer sizes must not be empty".into());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("").expect("valid config");

        assert_eq!(config.session.trials, 3);
        assert_eq!(config.session.trial_pause_ms, 1000);
        assert_eq!(config.session.log_mode, LogMode::Strict);
        assert_eq!(config.position.source, PositionSource::Gpsd);
        assert_eq!(config.position.address(), DEFAULT_GPSD_ADDRESS);
        assert_eq!(config.position.max_attempts, 15);
        assert_eq!(config.position.adb_port, 4352);
        assert_eq!(config.target_ssid, "eduroam");
        assert_eq!(config.reachability.address, "8.8.8.8:53");
    }

    #[test]
    fn partial_sections_override_defaults() {
        let config = parse_config(
            r#"
            [session]
            trials = 5
            log_mode = "lenient"
            user = "surveyor"

            [position]
            source = "nmea"
            min_consecutive = 3
            adb_port = 0

            [scan]
            target_ssid = "campus"

            [throughput]
            download_sizes = [350]
            timeout_ms = 2500
            "#,
        )
        .expect("valid config");

        assert_eq!(config.session.trials, 5);
        assert_eq!(config.session.trial_pause_ms, 1000);
        assert_eq!(config.session.log_mode, LogMode::Lenient);
        assert_eq!(config.session.user, "surveyor");
        assert_eq!(config.position.source, PositionSource::Nmea);
        assert_eq!(config.position.address(), DEFAULT_NMEA_ADDRESS);
        assert_eq!(config.position.min_consecutive, 3);
        assert_eq!(config.position.adb_port, 0);
        assert_eq!(config.target_ssid, "campus");
        assert_eq!(config.throughput.download_sizes, vec![350]);
        assert_eq!(config.throughput.timeout, Duration::from_millis(2500));
        assert_eq!(config.throughput.latency_probes, 3);
    }

    #[test]
    fn explicit_address_wins() {
        let config = parse_config("[position]\naddress = \"10.0.0.2:2947\"\n").expect("valid config");
        assert_eq!(config.position.address(), "10.0.0.2:2947");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(parse_config("[session]\nlog_mode = \"append\"\n").is_err());
        assert!(parse_config("[position]\nsource = \"glonass\"\n").is_err());
        assert!(parse_config("[session]\ntrails = 3\n").is_err());
        assert!(parse_config("[throughput]\nupload_sizes = []\n").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config("/nonexistent/bwsurvey.toml").is_err());
    }
}
