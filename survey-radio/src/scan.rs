use survey_common::{CandidateAccessPoint, LinkSnapshot};

use crate::radio::{NeighborScan, VisibleAccessPoint};

pub type AccessPointFilter = Box<dyn Fn(&VisibleAccessPoint) -> bool + Send>;

/// Keep only access points broadcasting `ssid`.
pub fn ssid_filter(ssid: impl Into<String>) -> AccessPointFilter {
    let ssid = ssid.into();
    Box::new(move |ap| ap.ssid == ssid)
}

pub fn any_network() -> AccessPointFilter {
    Box::new(|_| true)
}

/// Coarse band comparison of two frequencies in GHz.
///
/// Only `freq_b` is truncated before the integer division, so the test is
/// not symmetric: `same_band(6.1, 5.8)` holds while `same_band(5.8, 6.1)`
/// does not.
pub fn same_band(freq_a: f64, freq_b: f64) -> bool {
    let divisor = freq_b.trunc();
    if divisor == 0.0 {
        return false;
    }
    (freq_a / divisor).floor() == 1.0
}

/// Pick the neighbour that beats the current association.
///
/// A neighbour qualifies when it is a different BSSID on the same band with
/// strictly stronger signal. The last qualifying neighbour in scan order
/// wins, not the strongest one.
pub fn select_candidate(
    current: &LinkSnapshot,
    visible: &[VisibleAccessPoint],
) -> CandidateAccessPoint {
    let mut chosen: Option<&VisibleAccessPoint> = None;

    for ap in visible {
        if ap.bssid.eq_ignore_ascii_case(current.bssid()) {
            continue;
        }

        if same_band(current.frequency(), ap.frequency) && ap.rssi > current.rssi() {
            chosen = Some(ap);
        }
    }

    match chosen {
        Some(ap) => CandidateAccessPoint {
            bssid: ap.bssid.to_uppercase(),
            rssi: ap.rssi,
            quality: ap.quality,
            frequency: ap.frequency,
        },
        None => CandidateAccessPoint::none(),
    }
}

/// Better access point discovery on top of a passive scan capability.
pub struct NeighborScanner {
    scan: Box<dyn NeighborScan + Send>,
    filter: AccessPointFilter,
}

impl NeighborScanner {
    pub fn new(scan: Box<dyn NeighborScan + Send>, filter: AccessPointFilter) -> Self {
        Self { scan, filter }
    }

    /// Scan errors are absorbed into "no candidate".
    pub fn find_better_candidate(
        &mut self,
        current: &LinkSnapshot,
        interface: &str,
    ) -> CandidateAccessPoint {
        if !current.is_associated() {
            log::debug!("{} is not associated, skipping neighbour scan", interface);
            return CandidateAccessPoint::none();
        }

        match self.scan.scan(interface, &*self.filter) {
            Ok(visible) => {
                log::debug!("Scan on {} found {} access point(s)", interface, visible.len());
                select_candidate(current, &visible)
            }
            Err(e) => {
                log::warn!("Scan on {} failed: {}", interface, e);
                CandidateAccessPoint::none()
            }
        }
    }
}
