pub mod error;
pub mod platform;
pub mod radio;
pub mod scan;

pub use error::RadioError;
pub use radio::{LinkStateProvider, NeighborScan, VisibleAccessPoint};
pub use scan::{NeighborScanner, same_band, select_candidate};
