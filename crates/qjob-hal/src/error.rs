//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job cancelled")]
    JobCancelled,

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
