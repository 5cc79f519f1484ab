use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadioError {
    #[error("failed to run `{command}`: {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("radio query failed: {0}")]
    QueryFailed(String),

    #[error("scan failed: {0}")]
    ScanFailed(String),

    #[error("not supported on this platform")]
    NotSupported,
}
