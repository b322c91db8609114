//! Error types for the metrics core.

use thiserror::Error;

/// Result type alias for collector construction and registration.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Startup errors. None of these can happen at scrape time.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A descriptor does not match the labels its producer emits.
    #[error("metric schema mismatch: {0}")]
    Schema(String),

    #[error("collector already registered: {0}")]
    AlreadyRegistered(String),

    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("encoding error: {0}")]
    Encode(String),
}

/// Why a single resource object was skipped during a scrape.
///
/// Each variant maps to a stable `reason` label on the scrape failure counter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("object has no name")]
    MissingName,

    #[error("object has no owning project")]
    MissingProject,

    #[error("project has no namespace")]
    MissingNamespace,

    #[error("provider type is empty")]
    MissingProvider,

    #[error("plant has no cluster info")]
    MissingClusterInfo,

    #[error("shoot has no creation timestamp")]
    MissingCreationTimestamp,

    #[error("operation progress {0} is outside 0..=100")]
    InvalidProgress(i32),

    #[error("worker pool {pool} has minimum {minimum} above maximum {maximum}")]
    InvalidWorkerBounds {
        pool: String,
        minimum: u32,
        maximum: u32,
    },
}

impl ExtractError {
    /// Label value for the scrape failure counter.
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractError::MissingName => "missing_name",
            ExtractError::MissingProject => "missing_project",
            ExtractError::MissingNamespace => "missing_namespace",
            ExtractError::MissingProvider => "missing_provider",
            ExtractError::MissingClusterInfo => "missing_cluster_info",
            ExtractError::MissingCreationTimestamp => "missing_creation_timestamp",
            ExtractError::InvalidProgress(_) => "invalid_progress",
            ExtractError::InvalidWorkerBounds { .. } => "invalid_worker_bounds",
        }
    }
}
