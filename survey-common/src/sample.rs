use chrono::NaiveDateTime;

use crate::{CandidateAccessPoint, LinkSnapshot, Position, ThroughputResult};

/// One completed measurement cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub link: LinkSnapshot,
    pub position: Position,
    pub throughput: ThroughputResult,
    pub candidate: CandidateAccessPoint,
}
