use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

pub const DEFAULT_PROBE_ADDRESS: &str = "8.8.8.8:53";

/// Single round trip check that gates the throughput measurement.
pub trait ReachabilityProbe {
    fn is_reachable(&mut self) -> bool;
}

/// TCP connect to a well-known address.
pub struct TcpProbe {
    address: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_ADDRESS, Duration::from_secs(3))
    }
}

impl ReachabilityProbe for TcpProbe {
    fn is_reachable(&mut self) -> bool {
        let addr = match self.address.to_socket_addrs().map(|mut a| a.next()) {
            Ok(Some(addr)) => addr,
            Ok(None) | Err(_) => {
                log::warn!("Cannot resolve reachability probe {}", self.address);
                return false;
            }
        };

        match TcpStream::connect_timeout(&addr, self.timeout) {
            Ok(_) => true,
            Err(e) => {
                log::info!("{} unreachable: {}", addr, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn listening_address_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bound listener");
        let address = listener.local_addr().expect("local address").to_string();

        let mut probe = TcpProbe::new(address, Duration::from_secs(1));
        assert!(probe.is_reachable());
    }

    #[test]
    fn closed_port_is_unreachable() {
        let address = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bound listener");
            listener.local_addr().expect("local address").to_string()
        };

        let mut probe = TcpProbe::new(address, Duration::from_secs(1));
        assert!(!probe.is_reachable());
    }

    #[test]
    fn unresolvable_address_is_unreachable() {
        let mut probe = TcpProbe::new("not an address", Duration::from_secs(1));
        assert!(!probe.is_reachable());
    }
}
