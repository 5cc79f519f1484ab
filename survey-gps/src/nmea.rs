//! Position from raw NMEA 0183 sentences forwarded by a companion phone.
//!
//! The phone's GPS feed arrives over an ADB port forward. Sentences buffered
//! before the connection was made can be stale, so a fix is only trusted once
//! several GGA sentences in a row have decoded to a valid position.

use survey_common::{Interrupt, Position};

use crate::error::PositionError;
use crate::liveness::LivenessCheck;
use crate::provider::{run_checks, PositionProvider};
use crate::transport::{read_report, ReadOutcome, ReportStream, Transport};

/// Consecutive valid GGA sentences required before a fix is trusted.
pub const DEFAULT_MIN_CONSECUTIVE: usize = 5;

/// Decoded GGA (fix data) sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GgaFix {
    pub latitude: f64,
    pub longitude: f64,
    /// 0 = invalid, 1 = GPS, 2 = DGPS, ...
    pub quality: u8,
    pub satellites: u8,
}

impl GgaFix {
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

/// True for any talker's GGA sentence ("$GPGGA", "$GNGGA", ...).
pub fn is_gga(line: &str) -> bool {
    match line.find('$') {
        Some(start) => line[start..].get(3..6) == Some("GGA"),
        None => false,
    }
}

/// Decode a GGA sentence. Returns `None` for other sentences, checksum
/// mismatches, missing coordinates and fix quality 0.
pub fn parse_gga(line: &str) -> Option<GgaFix> {
    let start = line.find('$')?;
    let sentence = line[start + 1..].trim_end();

    let body = match sentence.split_once('*') {
        Some((body, checksum)) => {
            let expected = u8::from_str_radix(checksum.get(..2)?, 16).ok()?;
            if checksum_of(body) != expected {
                return None;
            }
            body
        }
        None => sentence,
    };

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < 8 || fields[0].get(2..5) != Some("GGA") {
        return None;
    }

    let quality: u8 = fields[6].parse().ok()?;
    if quality == 0 {
        return None;
    }

    let latitude = parse_coordinate(fields[2], fields[3], 'S')?;
    let longitude = parse_coordinate(fields[4], fields[5], 'W')?;
    let satellites = fields[7].parse().unwrap_or(0);

    Some(GgaFix {
        latitude,
        longitude,
        quality,
        satellites,
    })
}

fn checksum_of(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// "4025.4220" + "N" -> 40.42370; `negative` is the hemisphere that flips sign.
fn parse_coordinate(value: &str, hemisphere: &str, negative: char) -> Option<f64> {
    let raw: f64 = value.parse().ok()?;
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    match hemisphere.chars().next()? {
        h if h == negative => Some(-decimal),
        'N' | 'S' | 'E' | 'W' => Some(decimal),
        _ => None,
    }
}

/// Opens a fresh connection for every fix so stale buffered sentences from
/// an earlier acquisition are never reused.
pub struct NmeaProvider {
    transport: Box<dyn Transport + Send>,
    checks: Vec<Box<dyn LivenessCheck + Send>>,
    interrupt: Interrupt,
    min_consecutive: usize,
}

impl NmeaProvider {
    pub fn new(
        transport: Box<dyn Transport + Send>,
        checks: Vec<Box<dyn LivenessCheck + Send>>,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            transport,
            checks,
            interrupt,
            min_consecutive: DEFAULT_MIN_CONSECUTIVE,
        }
    }

    pub fn with_min_consecutive(mut self, min_consecutive: usize) -> Self {
        self.min_consecutive = min_consecutive.max(1);
        self
    }
}

impl PositionProvider for NmeaProvider {
    fn check_source(&mut self) -> Result<(), PositionError> {
        run_checks(&self.checks)
    }

    fn acquire_fix(&mut self, max_attempts: usize) -> Result<Position, PositionError> {
        let mut stream: Option<ReportStream> = None;
        let mut consecutive = 0;

        for attempt in 1..=max_attempts {
            if self.interrupt.take() {
                return Err(PositionError::Interrupted);
            }
            self.check_source()?;

            let mut current = match stream.take() {
                Some(current) => current,
                None => self.transport.open().map_err(|e| {
                    PositionError::SourceUnavailable(format!("cannot connect to NMEA bridge: {}", e))
                })?,
            };

            match read_report(&mut current) {
                ReadOutcome::Line(line) => {
                    stream = Some(current);
                    if !is_gga(&line) {
                        continue;
                    }
                    match parse_gga(&line) {
                        Some(fix) => {
                            consecutive += 1;
                            if consecutive >= self.min_consecutive {
                                log::debug!(
                                    "GGA fix after {} attempt(s), {} satellite(s)",
                                    attempt,
                                    fix.satellites
                                );
                                return Ok(fix.position());
                            }
                        }
                        None => consecutive = 0,
                    }
                }
                ReadOutcome::Timeout => {
                    log::debug!("No NMEA sentence on attempt {}", attempt);
                    stream = Some(current);
                }
                ReadOutcome::Closed => {
                    log::warn!("NMEA bridge closed the connection");
                    consecutive = 0;
                }
                ReadOutcome::Failed(e) => {
                    log::warn!("NMEA read failed: {}", e);
                    consecutive = 0;
                }
            }
        }

        Err(PositionError::LockFailure {
            attempts: max_attempts,
        })
    }
}
