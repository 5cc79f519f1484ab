use serde::Serialize;

/// Neighbouring access point that would serve the station better than the
/// current association.
///
/// The zero value means no such neighbour was found. Real candidates always
/// carry a BSSID, which is what tells the two apart.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CandidateAccessPoint {
    pub bssid: String,
    pub rssi: i32,
    pub quality: i32,
    /// GHz
    pub frequency: f64,
}

impl CandidateAccessPoint {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.bssid.is_empty()
    }
}
