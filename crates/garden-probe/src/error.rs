//! Error types for API server probes.

use std::time::Duration;

use thiserror::Error;

/// Why an API server probe did not produce a measurement.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid api server url: {0}")]
    InvalidUrl(String),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("tls error: {0}")]
    Tls(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("api server answered with status {0}")]
    Status(u16),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}
