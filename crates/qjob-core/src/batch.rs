//! Sequential batch execution.
//!
//! One authenticated backend handle is set up per batch and reused for every
//! job. Jobs run strictly one after another: job `i + 1` is submitted only
//! after the counts of job `i` were read back.

use std::fmt;

use chrono::{DateTime, Local};
use qjob_hal::{BackendConfig, BackendConnector, HalError};
use serde::{Deserialize, Serialize};

/// Credentials forwarded to the quantum service. Never persisted.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    pub token: String,
    /// IBM Cloud service CRN, or hub/group/project for a legacy token.
    #[serde(default)]
    pub instance: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            instance: None,
        }
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn is_present(&self) -> bool {
        !self.token.trim().is_empty()
    }

    pub(crate) fn backend_config(&self, backend: &str) -> BackendConfig {
        let config = BackendConfig::new(backend).with_token(self.token.clone());
        match self.instance.as_deref().filter(|i| !i.trim().is_empty()) {
            Some(instance) => config.with_instance(instance),
            None => config,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .finish()
    }
}

/// What to run and how often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub circuit: String,
    pub backend: String,
    pub shots: u32,
    pub job_count: u32,
}

/// What happens to completed jobs when a later one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Discard everything and report only the error.
    #[default]
    Abort,
    /// Keep the records of jobs that completed before the failure.
    KeepPartial,
}

/// One completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    /// Position in the batch, from zero.
    pub index: u32,
    pub label: String,
    pub count0: u64,
    pub count1: u64,
    pub shots: u32,
    pub timestamp: DateTime<Local>,
}

/// Progress report handed to a [`ProgressObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress<'a> {
    /// Index of the job that just completed.
    pub index: u32,
    pub total: u32,
    pub job_id: &'a str,
}

impl BatchProgress<'_> {
    pub fn completed(&self) -> u32 {
        self.index + 1
    }
}

/// Receives one call per completed job.
pub trait ProgressObserver: Send + Sync {
    fn job_completed(&self, progress: BatchProgress<'_>);
}

impl<F> ProgressObserver for F
where
    F: Fn(BatchProgress<'_>) + Send + Sync,
{
    fn job_completed(&self, progress: BatchProgress<'_>) {
        self(progress);
    }
}

/// Observer that ignores progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn job_completed(&self, _progress: BatchProgress<'_>) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    /// The underlying error text, unmodified.
    Error(String),
}

/// Records plus how the batch ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<JobResult>,
    #[serde(flatten)]
    pub status: BatchStatus,
}

impl BatchOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            status: BatchStatus::Error(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Success
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            BatchStatus::Success => None,
            BatchStatus::Error(message) => Some(message),
        }
    }
}

/// Per-batch knobs that do not come from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub label: String,
    pub policy: FailurePolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            label: "quantum_circuit".to_string(),
            policy: FailurePolicy::Abort,
        }
    }
}

/// Run `request.job_count` jobs of `request.circuit` on `request.backend`.
///
/// Failures never escape as `Err`: any error ends the batch and becomes
/// [`BatchStatus::Error`]. Under [`FailurePolicy::Abort`] the returned
/// results are then empty.
pub async fn run_batch(
    connector: &dyn BackendConnector,
    request: &ExecutionRequest,
    credentials: &Credentials,
    options: &BatchOptions,
    observer: &dyn ProgressObserver,
) -> BatchOutcome {
    let mut results = Vec::with_capacity(request.job_count as usize);

    match execute(connector, request, credentials, options, observer, &mut results).await {
        Ok(()) => {
            tracing::info!(jobs = results.len(), backend = %request.backend, "batch completed");
            BatchOutcome {
                results,
                status: BatchStatus::Success,
            }
        }
        Err(message) => {
            tracing::warn!(
                completed = results.len(),
                backend = %request.backend,
                "batch aborted: {message}"
            );
            if options.policy == FailurePolicy::Abort {
                results.clear();
            }
            BatchOutcome {
                results,
                status: BatchStatus::Error(message),
            }
        }
    }
}

async fn execute(
    connector: &dyn BackendConnector,
    request: &ExecutionRequest,
    credentials: &Credentials,
    options: &BatchOptions,
    observer: &dyn ProgressObserver,
    results: &mut Vec<JobResult>,
) -> Result<(), String> {
    if request.shots == 0 {
        return Err(HalError::InvalidShots("shots must be positive".into()).to_string());
    }
    if request.job_count == 0 {
        return Err("job count must be positive".to_string());
    }

    let circuit =
        qjob_qasm::parse_named(&request.circuit, &options.label).map_err(|e| e.to_string())?;

    tracing::info!(
        backend = %request.backend,
        shots = request.shots,
        jobs = request.job_count,
        "starting batch"
    );

    let backend = connector
        .connect(&credentials.backend_config(&request.backend))
        .await
        .map_err(|e| e.to_string())?;
    backend.validate(&circuit).await.map_err(|e| e.to_string())?;

    for index in 0..request.job_count {
        let job_id = backend
            .submit(&circuit, request.shots)
            .await
            .map_err(|e| e.to_string())?;
        let result = backend.wait(&job_id).await.map_err(|e| e.to_string())?;

        tracing::debug!(index, job_id = %job_id, "job completed");
        observer.job_completed(BatchProgress {
            index,
            total: request.job_count,
            job_id: job_id.as_str(),
        });
        results.push(JobResult {
            job_id: job_id.0,
            index,
            label: options.label.clone(),
            count0: result.counts.get("0"),
            count1: result.counts.get("1"),
            shots: request.shots,
            timestamp: Local::now(),
        });
    }

    Ok(())
}
