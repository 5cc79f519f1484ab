pub mod error;
pub mod gpsd;
pub mod liveness;
pub mod nmea;
pub mod provider;
pub mod transport;

pub use error::PositionError;
pub use gpsd::GpsdProvider;
pub use nmea::NmeaProvider;
pub use provider::{PositionProvider, DEFAULT_MAX_ATTEMPTS};
