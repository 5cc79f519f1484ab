use std::path::PathBuf;

use survey_speed::ThroughputError;
use thiserror::Error;

use crate::session::SessionState;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("log file {0} already exists")]
    AlreadyExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures that end a session. Everything else is absorbed into default
/// values of the sample.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    SourceUnavailable(String),

    #[error("reference server selection failed: {0}")]
    ReferenceServerSelection(#[source] ThroughputError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("cycle interrupted by operator")]
    Interrupted,

    #[error("operation not valid while session is {0:?}")]
    InvalidState(SessionState),
}
