//! Error types for the IBM Quantum adapter.

use qjob_hal::HalError;
use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors raised while talking to IBM Quantum.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IbmError {
    /// No token was supplied by the caller.
    #[error("IBM Quantum API token not provided")]
    MissingToken,

    /// The token contains characters that cannot go into an HTTP header.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// No CRN was given and the API key sees no IBM Quantum instance.
    #[error("service CRN required: no IBM Quantum instance is visible to this API key")]
    MissingInstance,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API.
    #[error("IBM Quantum API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The backend exists but is not accepting work.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// The service does not know this backend name.
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Circuit requires {required} qubits but backend only has {available}")]
    TooManyQubits { required: usize, available: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl IbmError {
    /// True when the API rejected the credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, IbmError::Api { status: 401 | 403, .. })
    }
}

impl From<IbmError> for HalError {
    fn from(e: IbmError) -> Self {
        if e.is_auth_failure() {
            return HalError::AuthenticationFailed(e.to_string());
        }
        match e {
            IbmError::MissingToken
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_)
            | IbmError::MissingInstance => HalError::AuthenticationFailed(e.to_string()),
            IbmError::Http(err) => HalError::Network(err),
            IbmError::Json(err) => HalError::Serialization(err),
            IbmError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmError::BackendUnavailable(msg) => HalError::BackendUnavailable(msg),
            IbmError::UnknownBackend(name) => HalError::UnknownBackend(name),
            IbmError::TooManyQubits { .. } => HalError::InvalidCircuit(e.to_string()),
            IbmError::InvalidParameter(msg) => HalError::Configuration(msg),
            IbmError::Api { .. } => HalError::Backend(e.to_string()),
        }
    }
}
