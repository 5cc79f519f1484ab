//! Client for speedtest.net style test servers.
//!
//! A server exposes `latency.txt`, `random<N>x<N>.jpg` download images and an
//! `upload.php` sink next to each other under one base URL.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use reqwest::blocking::Client;
use serde::Deserialize;
use survey_common::ReferenceServer;

use crate::error::ThroughputError;
use crate::provider::ThroughputProvider;

pub const DEFAULT_SERVER_LIST_URL: &str =
    "https://www.speedtest.net/api/js/servers?engine=js&https_functional=true&limit=10";

#[derive(Debug, Clone)]
pub struct SpeedtestConfig {
    pub server_list_url: String,
    /// Edge length of the `random<N>x<N>.jpg` images fetched per download trial.
    pub download_sizes: Vec<u32>,
    /// Body sizes in bytes posted per upload trial.
    pub upload_sizes: Vec<usize>,
    pub timeout: Duration,
    /// `latency.txt` fetches per candidate server.
    pub latency_probes: usize,
}

impl Default for SpeedtestConfig {
    fn default() -> Self {
        SpeedtestConfig {
            server_list_url: DEFAULT_SERVER_LIST_URL.to_string(),
            download_sizes: vec![350, 500, 750, 1000],
            upload_sizes: vec![250_000, 500_000],
            timeout: Duration::from_secs(10),
            latency_probes: 3,
        }
    }
}

/// Entry of the server list.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    /// Upload endpoint, e.g. `http://host:8080/speedtest/upload.php`.
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub sponsor: String,
}

impl ServerEntry {
    /// Directory that holds `latency.txt` and the download images.
    pub fn base_url(&self) -> &str {
        match self.url.rsplit_once('/') {
            Some((base, _)) => base,
            None => &self.url,
        }
    }
}

pub fn parse_server_list(body: &str) -> Result<Vec<ServerEntry>, ThroughputError> {
    serde_json::from_str(body)
        .map_err(|e| ThroughputError::ServerSelection(format!("invalid server list: {}", e)))
}

/// Transfer rate in Mbps.
pub fn megabits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    (bytes as f64 * 8.0) / secs / 1_000_000.0
}

pub struct SpeedtestClient {
    http: Client,
    config: SpeedtestConfig,
    selected: Option<ServerEntry>,
}

impl SpeedtestClient {
    pub fn new(config: SpeedtestConfig) -> Result<Self, ThroughputError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bwsurvey/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_http(http, config))
    }

    pub fn with_http(http: Client, config: SpeedtestConfig) -> Self {
        Self {
            http,
            config,
            selected: None,
        }
    }

    fn fetch_servers(&self) -> Result<Vec<ServerEntry>, ThroughputError> {
        let body = self
            .http
            .get(&self.config.server_list_url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| ThroughputError::ServerSelection(format!("server list: {}", e)))?;

        parse_server_list(&body)
    }

    /// Mean round trip of `latency.txt` in milliseconds.
    fn measure_latency(&self, server: &ServerEntry) -> Result<f64, ThroughputError> {
        let probes = self.config.latency_probes.max(1);
        let mut total = Duration::ZERO;

        for _ in 0..probes {
            let url = format!("{}/latency.txt?x={}", server.base_url(), cache_buster());
            let start = Instant::now();
            self.http.get(&url).send()?.error_for_status()?.bytes()?;
            total += start.elapsed();
        }

        Ok(total.as_secs_f64() * 1000.0 / probes as f64)
    }

    fn selected(&self) -> Result<&ServerEntry, ThroughputError> {
        self.selected.as_ref().ok_or(ThroughputError::NoServerSelected)
    }
}

impl ThroughputProvider for SpeedtestClient {
    fn select_reference_server(&mut self) -> Result<ReferenceServer, ThroughputError> {
        let servers = self.fetch_servers()?;
        if servers.is_empty() {
            return Err(ThroughputError::ServerSelection(
                "server list is empty".to_string(),
            ));
        }

        let mut best: Option<(ServerEntry, f64)> = None;
        for server in servers {
            match self.measure_latency(&server) {
                Ok(latency) => {
                    log::debug!("{} ({}) latency {:.1} ms", server.name, server.url, latency);
                    if best.as_ref().map_or(true, |(_, l)| latency < *l) {
                        best = Some((server, latency));
                    }
                }
                Err(e) => log::debug!("{} unreachable: {}", server.url, e),
            }
        }

        let (server, latency_ms) = best.ok_or_else(|| {
            ThroughputError::ServerSelection("no server answered the latency probe".to_string())
        })?;

        log::info!(
            "Selected test server {} ({}) {:.1} ms",
            server.name,
            server.sponsor,
            latency_ms
        );

        let reference = ReferenceServer {
            name: server.name.clone(),
            url: server.url.clone(),
            latency_ms,
        };
        self.selected = Some(server);

        Ok(reference)
    }

    fn download_trial(&mut self) -> Result<f64, ThroughputError> {
        let base = self.selected()?.base_url().to_string();
        let mut bytes = 0u64;
        let start = Instant::now();

        for size in &self.config.download_sizes {
            let url = format!("{}/random{}x{}.jpg?x={}", base, size, size, cache_buster());
            let image = self.http.get(&url).send()?.error_for_status()?.bytes()?;
            bytes += image.len() as u64;
        }

        Ok(megabits_per_second(bytes, start.elapsed()))
    }

    fn upload_trial(&mut self) -> Result<f64, ThroughputError> {
        let url = self.selected()?.url.clone();
        let mut bytes = 0u64;
        let start = Instant::now();

        for size in &self.config.upload_sizes {
            let body = upload_body(*size);
            let len = body.len() as u64;
            self.http
                .post(format!("{}?x={}", url, cache_buster()))
                .body(body)
                .send()?
                .error_for_status()?;
            bytes += len;
        }

        Ok(megabits_per_second(bytes, start.elapsed()))
    }
}

/// Form-encoded filler accepted by `upload.php`.
fn upload_body(size: usize) -> Vec<u8> {
    const PREFIX: &[u8] = b"content1=";
    const FILLER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    let mut body = Vec::with_capacity(size.max(PREFIX.len()));
    body.extend_from_slice(PREFIX);
    while body.len() < size {
        body.push(FILLER[(body.len() - PREFIX.len()) % FILLER.len()]);
    }
    body
}

fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}
