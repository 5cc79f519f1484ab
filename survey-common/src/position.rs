use std::fmt;

use serde::Serialize;

/// Coordinate fix in decimal degrees.
///
/// (0.0, 0.0) is the "no fix" sentinel. A real fix at that exact spot is
/// indistinguishable from it and is treated as no fix as well.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub const NO_FIX: Position = Position {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_no_fix(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LAT: {}\nLON: {}", self.latitude, self.longitude)
    }
}
