pub mod candidate;
pub mod interrupt;
pub mod link;
pub mod position;
pub mod sample;
pub mod throughput;
pub mod time;

pub use candidate::CandidateAccessPoint;
pub use interrupt::Interrupt;
pub use link::{AssociatedLink, LinkSnapshot};
pub use position::Position;
pub use sample::Sample;
pub use throughput::{ReferenceServer, ThroughputResult};
