//! Position from gpsd's JSON report stream.
//!
//! gpsd emits one JSON object per line. Only `TPV` (time-position-velocity)
//! reports carry coordinates; `VERSION`, `DEVICES`, `WATCH`, `SKY` and the
//! rest are read and discarded, each costing one attempt.

use serde::Deserialize;
use survey_common::{Interrupt, Position};

use crate::error::PositionError;
use crate::liveness::LivenessCheck;
use crate::provider::{run_checks, PositionProvider};
use crate::transport::{read_report, ReadOutcome, ReportStream, Transport};

pub const GPSD_WATCH: &str = "?WATCH={\"enable\":true,\"json\":true};\n";
pub const TPV_CLASS: &str = "TPV";

#[derive(Debug, Deserialize)]
struct Report {
    class: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Coordinates of a TPV report. A TPV without coordinates (mode 1, no fix
/// yet) yields the (0.0, 0.0) sentinel.
pub fn parse_tpv(line: &str) -> Option<Position> {
    let report: Report = serde_json::from_str(line).ok()?;
    if report.class != TPV_CLASS {
        return None;
    }
    Some(Position::new(
        report.lat.unwrap_or(0.0),
        report.lon.unwrap_or(0.0),
    ))
}

/// Opens a fresh `?WATCH` connection for every fix. Reports gpsd queued on a
/// long-lived connection while the operator was idle would otherwise be read
/// first and place the fix where the previous cycle ended.
pub struct GpsdProvider {
    transport: Box<dyn Transport + Send>,
    checks: Vec<Box<dyn LivenessCheck + Send>>,
    interrupt: Interrupt,
}

impl GpsdProvider {
    pub fn new(
        transport: Box<dyn Transport + Send>,
        checks: Vec<Box<dyn LivenessCheck + Send>>,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            transport,
            checks,
            interrupt,
        }
    }
}

impl PositionProvider for GpsdProvider {
    fn check_source(&mut self) -> Result<(), PositionError> {
        run_checks(&self.checks)
    }

    fn acquire_fix(&mut self, max_attempts: usize) -> Result<Position, PositionError> {
        let mut stream: Option<ReportStream> = None;

        for attempt in 1..=max_attempts {
            if self.interrupt.take() {
                return Err(PositionError::Interrupted);
            }
            self.check_source()?;

            let mut current = match stream.take() {
                Some(current) => current,
                None => self.transport.open().map_err(|e| {
                    PositionError::SourceUnavailable(format!("cannot connect to gpsd: {}", e))
                })?,
            };

            match read_report(&mut current) {
                ReadOutcome::Line(line) => {
                    stream = Some(current);
                    if let Some(position) = parse_tpv(&line) {
                        log::debug!("TPV report on attempt {}", attempt);
                        return Ok(position);
                    }
                }
                ReadOutcome::Timeout => {
                    log::debug!("No gpsd report on attempt {}", attempt);
                    stream = Some(current);
                }
                ReadOutcome::Closed => log::warn!("gpsd closed the connection"),
                ReadOutcome::Failed(e) => log::warn!("gpsd read failed: {}", e),
            }
        }

        Err(PositionError::LockFailure {
            attempts: max_attempts,
        })
    }
}
