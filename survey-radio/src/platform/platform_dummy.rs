use survey_common::AssociatedLink;

use crate::{
    error::RadioError,
    radio::{LinkStateProvider, NeighborScan, VisibleAccessPoint},
};

pub struct DummyRadio;

impl DummyRadio {
    pub fn new() -> Self {
        DummyRadio
    }
}

impl LinkStateProvider for DummyRadio {
    fn query_link(&mut self, _interface: &str) -> Result<Option<AssociatedLink>, RadioError> {
        Err(RadioError::NotSupported)
    }
}

impl NeighborScan for DummyRadio {
    fn scan(
        &mut self,
        _interface: &str,
        _filter: &dyn Fn(&VisibleAccessPoint) -> bool,
    ) -> Result<Vec<VisibleAccessPoint>, RadioError> {
        Err(RadioError::NotSupported)
    }
}

pub fn is_wireless_interface(_interface: &str) -> bool {
    false
}

pub type PlatformRadio = DummyRadio;
