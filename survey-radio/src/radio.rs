use survey_common::{AssociatedLink, LinkSnapshot};

use crate::error::RadioError;

/// Access point seen by a passive scan.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleAccessPoint {
    pub bssid: String,
    pub ssid: String,
    pub rssi: i32,
    pub quality: i32,
    /// GHz
    pub frequency: f64,
}

pub trait LinkStateProvider {
    /// Association metrics of `interface`, `None` when it has no link.
    fn query_link(&mut self, interface: &str) -> Result<Option<AssociatedLink>, RadioError>;

    /// Snapshot of the current association. Query errors are absorbed into an
    /// unassociated snapshot because link state is transient.
    fn poll(&mut self, interface: &str) -> LinkSnapshot {
        match self.query_link(interface) {
            Ok(Some(link)) => LinkSnapshot::associated(interface, link),
            Ok(None) => LinkSnapshot::unassociated(interface),
            Err(e) => {
                log::warn!("Link query on {} failed: {}", interface, e);
                LinkSnapshot::unassociated(interface)
            }
        }
    }
}

pub trait NeighborScan {
    /// Visible access points on `interface` that pass `filter`.
    fn scan(
        &mut self,
        interface: &str,
        filter: &dyn Fn(&VisibleAccessPoint) -> bool,
    ) -> Result<Vec<VisibleAccessPoint>, RadioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakyRadio {
        result: Option<Result<Option<AssociatedLink>, RadioError>>,
    }

    impl LinkStateProvider for FlakyRadio {
        fn query_link(&mut self, _interface: &str) -> Result<Option<AssociatedLink>, RadioError> {
            self.result.take().expect("single query")
        }
    }

    #[test]
    fn query_error_yields_unassociated_snapshot() {
        let mut radio = FlakyRadio {
            result: Some(Err(RadioError::QueryFailed("device busy".into()))),
        };

        let snapshot = radio.poll("wlan0");

        assert_eq!(snapshot, LinkSnapshot::unassociated("wlan0"));
    }

    #[test]
    fn associated_query_is_wrapped() {
        let mut radio = FlakyRadio {
            result: Some(Ok(Some(AssociatedLink {
                ssid: "eduroam".into(),
                bssid: "00:11:22:aa:bb:cc".into(),
                rssi: -61,
                quality: 49,
                frequency: 5.18,
                bitrate: 400.0,
            }))),
        };

        let snapshot = radio.poll("wlp3s0");

        assert!(snapshot.is_associated());
        assert_eq!(snapshot.interface(), "wlp3s0");
        assert_eq!(snapshot.bssid(), "00:11:22:AA:BB:CC");
    }
}
