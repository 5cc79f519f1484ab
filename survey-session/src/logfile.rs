//! Per-session CSV log.
//!
//! One header line, then one line per sample in column order. Every row is
//! flushed as soon as it is written so a crash loses at most the sample in
//! flight.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::{Terminator, Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use survey_common::time::format_timestamp;
use survey_common::Sample;

use crate::error::LogError;

pub const COLUMNS: [&str; 18] = [
    "time",
    "ssid",
    "bssid",
    "rssi",
    "quality",
    "frequency",
    "bitrate",
    "lat",
    "lon",
    "download",
    "upload",
    "test-server-city",
    "test-server-url",
    "test-server-latency",
    "bap-bssid",
    "bap-rssi",
    "bap-quality",
    "bap-frequency",
];

/// What to do when the log file for this session already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Refuse to start.
    #[default]
    Strict,
    /// Truncate and start over.
    Lenient,
}

/// One log line. Field order is column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub time: String,
    pub ssid: String,
    pub bssid: String,
    pub rssi: i32,
    pub quality: i32,
    pub frequency: f64,
    pub bitrate: f64,
    pub lat: f64,
    pub lon: f64,
    pub download: f64,
    pub upload: f64,
    #[serde(rename = "test-server-city")]
    pub test_server_city: String,
    #[serde(rename = "test-server-url")]
    pub test_server_url: String,
    #[serde(rename = "test-server-latency")]
    pub test_server_latency: f64,
    #[serde(rename = "bap-bssid")]
    pub bap_bssid: String,
    #[serde(rename = "bap-rssi")]
    pub bap_rssi: i32,
    #[serde(rename = "bap-quality")]
    pub bap_quality: i32,
    #[serde(rename = "bap-frequency")]
    pub bap_frequency: f64,
}

impl From<&Sample> for LogRow {
    fn from(sample: &Sample) -> Self {
        let link = &sample.link;
        let server = &sample.throughput.server;
        let candidate = &sample.candidate;

        Self {
            time: format_timestamp(&sample.timestamp),
            ssid: link.ssid().to_string(),
            bssid: link.bssid().to_string(),
            rssi: link.rssi(),
            quality: link.quality(),
            frequency: link.frequency(),
            bitrate: link.bitrate(),
            lat: sample.position.latitude,
            lon: sample.position.longitude,
            download: sample.throughput.download_mbps,
            upload: sample.throughput.upload_mbps,
            test_server_city: server.name.clone(),
            test_server_url: server.url.clone(),
            test_server_latency: server.latency_ms,
            bap_bssid: candidate.bssid.clone(),
            bap_rssi: candidate.rssi,
            bap_quality: candidate.quality,
            bap_frequency: candidate.frequency,
        }
    }
}

/// "bwtest-<user>-<YYYY-MM-DDTHH:MM:SS>.log"
pub fn log_file_name(user: &str, started: &NaiveDateTime) -> String {
    format!("bwtest-{}-{}.log", user, format_timestamp(started))
}

pub struct SessionLog {
    path: PathBuf,
    writer: Option<Writer<File>>,
    rows: u64,
}

impl SessionLog {
    /// Create the log in `dir` and write the header.
    pub fn create(
        dir: &Path,
        user: &str,
        started: &NaiveDateTime,
        mode: LogMode,
    ) -> Result<Self, LogError> {
        let path = dir.join(log_file_name(user, started));

        let file = match mode {
            LogMode::Strict => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => LogError::AlreadyExists(path.clone()),
                    _ => LogError::Io(e),
                })?,
            LogMode::Lenient => File::create(&path)?,
        };

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);

        writer.write_record(COLUMNS)?;
        writer.flush()?;

        log::info!("Logging samples to {}", path.display());

        Ok(Self {
            path,
            writer: Some(writer),
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Samples written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn append(&mut self, sample: &Sample) -> Result<(), LogError> {
        let writer = match self.writer.as_mut() {
            Some(writer) => writer,
            None => {
                return Err(LogError::Io(std::io::Error::new(
                    ErrorKind::BrokenPipe,
                    "session log already closed",
                )))
            }
        };

        writer.serialize(LogRow::from(sample))?;
        writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and release the file. Safe to call more than once.
    pub fn finish(&mut self) -> Result<(), LogError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            log::info!("Closed {} after {} sample(s)", self.path.display(), self.rows);
        }
        Ok(())
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::error!("Failed to close {}: {}", self.path.display(), e);
        }
    }
}
