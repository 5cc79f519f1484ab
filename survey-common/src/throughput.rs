use serde::Serialize;

/// Endpoint the bandwidth trials run against. Selected once per session.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReferenceServer {
    /// City or sponsor name.
    pub name: String,
    pub url: String,
    pub latency_ms: f64,
}

/// Averaged download and upload rates of one sample, in Mbps.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ThroughputResult {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub server: ReferenceServer,
}

impl ThroughputResult {
    /// Result recorded when the measurement was not attempted.
    pub fn skipped(server: &ReferenceServer) -> Self {
        Self {
            download_mbps: 0.0,
            upload_mbps: 0.0,
            server: server.clone(),
        }
    }
}
