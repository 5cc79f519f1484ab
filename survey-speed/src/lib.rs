pub mod error;
pub mod provider;
pub mod reachability;
pub mod speedtest;

pub use error::ThroughputError;
pub use provider::ThroughputProvider;
pub use reachability::{ReachabilityProbe, TcpProbe};
pub use speedtest::{SpeedtestClient, SpeedtestConfig};
