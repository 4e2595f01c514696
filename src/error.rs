use thiserror::Error;

/// Failure talking to the market-data API. Never fatal: callers either
/// surface it as a dashboard error state or degrade to an empty result.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{source_name} HTTP {status}: {body}")]
    Status {
        source_name: String,
        status: u16,
        body: String,
    },

    #[error("{source_name} parse failed: {reason}")]
    Decode { source_name: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
