//! Error types for qjob-core.

use qjob_assistant::AssistantError;
use qjob_hal::HalError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the session layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A client this operation depends on was not built in.
    #[error("{0} not available")]
    Unavailable(&'static str),

    /// Request parameters outside the configured bounds.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("A batch is already running")]
    BatchRunning,

    #[error(transparent)]
    Backend(#[from] HalError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
