use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    /// A bridge or daemon the source depends on is not running.
    #[error("position source unavailable: {0}")]
    SourceUnavailable(String),

    /// The source is up but produced no usable fix within the attempt budget.
    #[error("unable to obtain a position fix after {attempts} attempt(s)")]
    LockFailure { attempts: usize },

    #[error("position acquisition interrupted")]
    Interrupted,
}
