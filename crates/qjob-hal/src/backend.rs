//! Backend trait and configuration.
//!
//! A [`BackendConnector`] turns caller-supplied credentials and a backend
//! name into an authenticated [`Backend`] handle. The handle drives the job
//! lifecycle:
//!
//! ```text
//!   connect() ──→ validate() ──→ submit() ──→ status() ──→ result()
//! ```
//!
//! | Method | Kind | Required |
//! |--------|------|----------|
//! | `name()` | sync | yes |
//! | `availability()` | async | yes |
//! | `validate()` | async | provided |
//! | `submit()` | async | yes |
//! | `status()` | async | yes |
//! | `result()` | async | yes |
//! | `wait()` | async | provided |

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qjob_ir::Circuit;
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Connection settings for one backend.
///
/// Credentials are never serialized and are redacted from `Debug` output.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the target backend, e.g. `ibm_brisbane`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Provider-specific instance or service identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl BackendConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// The token, or a [`HalError::AuthenticationFailed`] when absent or blank.
    pub fn require_token(&self) -> HalResult<&str> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(HalError::AuthenticationFailed(
                "no API token provided".into(),
            )),
        }
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("instance", &self.instance)
            .finish()
    }
}

/// Polling schedule used by [`Backend::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    /// `None` waits for as long as the remote service keeps the job alive.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: None,
        }
    }
}

/// A connected quantum backend.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    /// Liveness and queue depth.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check a circuit against backend constraints before submission.
    async fn validate(&self, _circuit: &Circuit) -> HalResult<()> {
        Ok(())
    }

    /// Submit a circuit. The job starts `Queued`.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Result of a job whose status is `Completed`.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::default()
    }

    /// Block until the job reaches a terminal state and return its result.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let policy = self.wait_policy();
        let started = tokio::time::Instant::now();

        loop {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    if policy.timeout.is_some_and(|t| started.elapsed() >= t) {
                        return Err(HalError::Timeout(job_id.0.clone()));
                    }
                    tracing::trace!(job_id = %job_id, "job pending");
                    tokio::time::sleep(policy.poll_interval).await;
                }
            }
        }
    }
}

/// Creates authenticated [`Backend`] handles for one provider.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// Provider name, e.g. `ibm`.
    fn provider(&self) -> &str;

    /// Authenticate and resolve `config.name` to a backend handle.
    async fn connect(&self, config: &BackendConfig) -> HalResult<Arc<dyn Backend>>;
}

/// Backend availability information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendAvailability {
    pub is_available: bool,
    /// Jobs waiting ahead of a new submission, if known.
    pub queue_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl BackendAvailability {
    pub fn available(queue_depth: u32) -> Self {
        Self {
            is_available: true,
            queue_depth: Some(queue_depth),
            status_message: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

impl fmt::Display for BackendAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_available, self.queue_depth, &self.status_message) {
            (true, Some(n), _) => write!(f, "Available ({n} pending jobs)"),
            (true, None, _) => write!(f, "Available"),
            (false, _, Some(reason)) => write!(f, "Unavailable: {reason}"),
            (false, _, None) => write!(f, "Unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Counts;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backend_config_redacts_token() {
        let config = BackendConfig::new("ibm_brisbane")
            .with_token("secret-token")
            .with_instance("crn:v1:test");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!serde_json::to_string(&config).unwrap().contains("secret-token"));
    }

    #[test]
    fn test_require_token() {
        assert!(BackendConfig::new("b").require_token().is_err());
        assert!(BackendConfig::new("b").with_token("   ").require_token().is_err());
        assert_eq!(
            BackendConfig::new("b").with_token(" abc ").require_token().unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_availability_display() {
        assert_eq!(
            BackendAvailability::available(3).to_string(),
            "Available (3 pending jobs)"
        );
        assert_eq!(
            BackendAvailability::unavailable("maintenance").to_string(),
            "Unavailable: maintenance"
        );
    }

    /// Reports `Running` for a fixed number of polls, then completes.
    struct SlowBackend {
        polls_left: AtomicU32,
        timeout: Option<Duration>,
    }

    #[async_trait]
    impl Backend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        async fn availability(&self) -> HalResult<BackendAvailability> {
            Ok(BackendAvailability::available(0))
        }

        async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
            Ok(JobId::new("job-1"))
        }

        async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            if self.polls_left.load(Ordering::SeqCst) == 0 {
                return Ok(JobStatus::Completed);
            }
            self.polls_left.fetch_sub(1, Ordering::SeqCst);
            Ok(JobStatus::Running)
        }

        async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
            let mut counts = Counts::new();
            counts.insert("1", 10);
            Ok(ExecutionResult::new(counts, 10))
        }

        fn wait_policy(&self) -> WaitPolicy {
            WaitPolicy {
                poll_interval: Duration::from_millis(500),
                timeout: self.timeout,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_polls_until_completed() {
        let backend = SlowBackend {
            polls_left: AtomicU32::new(5),
            timeout: None,
        };
        let result = backend.wait(&JobId::new("job-1")).await.unwrap();
        assert_eq!(result.counts.get("1"), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_honours_timeout() {
        let backend = SlowBackend {
            polls_left: AtomicU32::new(100),
            timeout: Some(Duration::from_secs(2)),
        };
        let err = backend.wait(&JobId::new("job-1")).await.unwrap_err();
        assert!(matches!(err, HalError::Timeout(id) if id == "job-1"));
    }
}
