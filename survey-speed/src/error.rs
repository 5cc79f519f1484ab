use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThroughputError {
    #[error("reference server selection failed: {0}")]
    ServerSelection(String),

    #[error("no reference server selected")]
    NoServerSelected,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}
