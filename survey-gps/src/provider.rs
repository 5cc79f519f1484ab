use survey_common::Position;

use crate::error::PositionError;
use crate::liveness::LivenessCheck;

/// Number of reports read before giving up on a fix.
pub const DEFAULT_MAX_ATTEMPTS: usize = 15;

pub trait PositionProvider {
    /// Verify every bridge and daemon the source depends on.
    fn check_source(&mut self) -> Result<(), PositionError>;

    /// Read up to `max_attempts` reports and return the first usable fix.
    ///
    /// The source is re-validated before each attempt; an unavailable source
    /// fails with [`PositionError::SourceUnavailable`] without using up the
    /// attempt budget.
    fn acquire_fix(&mut self, max_attempts: usize) -> Result<Position, PositionError>;
}

pub(crate) fn run_checks(checks: &[Box<dyn LivenessCheck + Send>]) -> Result<(), PositionError> {
    for check in checks {
        check.check().map_err(|reason| {
            log::debug!("Liveness check '{}' failed", check.name());
            PositionError::SourceUnavailable(reason)
        })?;
    }
    Ok(())
}
