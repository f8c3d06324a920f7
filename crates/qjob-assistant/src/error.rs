//! Error types for the assistant bridge.

use thiserror::Error;

/// Errors returned by [`crate::Assistant`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssistantError {
    #[error("Groq API key not provided")]
    MissingApiKey,

    /// No chat client is compiled in or configured.
    #[error("Assistant not available: {0}")]
    Unavailable(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Chat API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Chat API returned no content")]
    EmptyResponse,

    #[error("Unknown quick action: {0}")]
    UnknownQuickAction(String),
}

/// Result type for assistant operations.
pub type AssistantResult<T> = Result<T, AssistantError>;
