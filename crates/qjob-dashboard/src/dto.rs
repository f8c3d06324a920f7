//! Data Transfer Objects for the dashboard API.

use qjob_assistant::QuickAction;
use qjob_core::{
    BatchOutcome, ChatEntry, CredentialPresence, Credentials, ExecutionConfig, FailurePolicy,
    JobResult, ParamsUpdate, ResultsSummary, ServiceAvailability, SessionParams,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Health and status
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" if responding.
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Status indicators.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub clients: ServiceAvailability,
    pub credentials: CredentialPresence,
    pub running: bool,
}

/// Defaults, bounds and choices offered by the panel.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub execution: ExecutionConfig,
    pub assistant_model: String,
    pub quick_actions: Vec<QuickActionView>,
}

#[derive(Debug, Serialize)]
pub struct QuickActionView {
    pub name: &'static str,
    pub label: &'static str,
}

impl From<QuickAction> for QuickActionView {
    fn from(action: QuickAction) -> Self {
        Self {
            name: action.name(),
            label: action.label(),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub params: SessionParams,
    pub running: bool,
    pub result_count: usize,
    pub chat_length: usize,
}

// ============================================================================
// Circuits
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Source to check; the session circuit when absent.
    #[serde(default)]
    pub qasm: Option<String>,
}

// ============================================================================
// Runs and results
// ============================================================================

/// IBM Quantum credentials as entered in the panel.
#[derive(Deserialize)]
pub struct QuantumCredentials {
    pub ibm_token: String,
    /// Service CRN for IBM Cloud accounts.
    #[serde(default)]
    pub ibm_instance: Option<String>,
}

impl QuantumCredentials {
    pub fn to_credentials(&self) -> Credentials {
        let credentials = Credentials::new(self.ibm_token.clone());
        match &self.ibm_instance {
            Some(instance) => credentials.with_instance(instance.clone()),
            None => credentials,
        }
    }
}

#[derive(Deserialize)]
pub struct RunRequest {
    #[serde(flatten)]
    pub credentials: QuantumCredentials,
    /// Parameter changes applied to the session before running.
    #[serde(flatten)]
    pub params: ParamsUpdate,
    /// Overrides the configured policy for this run.
    #[serde(default)]
    pub failure_policy: Option<FailurePolicy>,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run_id: Uuid,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
    pub summary: ResultsSummary,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub results: Vec<JobResult>,
    pub summary: ResultsSummary,
}

// ============================================================================
// Assistant
// ============================================================================

#[derive(Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    pub groq_api_key: String,
}

#[derive(Deserialize)]
pub struct QuickActionRequest {
    pub groq_api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: ChatEntry,
    /// Circuit found in the reply, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub circuit: String,
    pub valid: bool,
    pub detail: String,
}

// ============================================================================
// Backends
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BackendList {
    pub backends: Vec<String>,
    pub default: String,
}

#[derive(Debug, Serialize)]
pub struct BackendStatusResponse {
    pub backend: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_jobs: Option<u32>,
    /// Human-readable summary, e.g. "Available (3 pending jobs)".
    pub message: String,
}
