//! Per-user session state.
//!
//! A [`Session`] owns the editor circuit, the run parameters, the latest
//! results and the chat history. Credentials are never stored here.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::aggregate::{ResultsSummary, summarize};
use crate::batch::{ExecutionRequest, JobResult};
use crate::chat::ChatHistory;
use crate::config::ExecutionConfig;
use crate::error::{CoreError, CoreResult};
use crate::probe::ServiceAvailability;

/// Shared "a batch is running" flag.
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claim the flag, or fail with [`CoreError::BatchRunning`].
    pub fn try_start(&self) -> CoreResult<RunGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::BatchRunning)?;
        Ok(RunGuard(self.0.clone()))
    }
}

/// Clears the run flag when dropped.
#[derive(Debug)]
pub struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Editable run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionParams {
    pub circuit: String,
    pub backend: String,
    pub shots: u32,
    pub job_count: u32,
}

impl SessionParams {
    fn to_request(&self) -> ExecutionRequest {
        ExecutionRequest {
            circuit: self.circuit.clone(),
            backend: self.backend.clone(),
            shots: self.shots,
            job_count: self.job_count,
        }
    }
}

/// Partial parameter change; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParamsUpdate {
    pub circuit: Option<String>,
    pub backend: Option<String>,
    pub shots: Option<u32>,
    pub job_count: Option<u32>,
}

#[derive(Debug)]
pub struct Session {
    defaults: ExecutionConfig,
    params: SessionParams,
    results: Vec<JobResult>,
    chat: ChatHistory,
    running: RunFlag,
    capabilities: ServiceAvailability,
}

impl Session {
    pub fn new(defaults: ExecutionConfig, capabilities: ServiceAvailability) -> Self {
        Self {
            params: Self::default_params(&defaults),
            defaults,
            results: Vec::new(),
            chat: ChatHistory::new(),
            running: RunFlag::default(),
            capabilities,
        }
    }

    fn default_params(defaults: &ExecutionConfig) -> SessionParams {
        SessionParams {
            circuit: defaults.default_qasm.clone(),
            backend: defaults.default_backend().to_string(),
            shots: defaults.default_shots,
            job_count: defaults.default_job_count,
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn limits(&self) -> &ExecutionConfig {
        &self.defaults
    }

    pub fn capabilities(&self) -> &ServiceAvailability {
        &self.capabilities
    }

    pub fn circuit(&self) -> &str {
        &self.params.circuit
    }

    pub fn set_circuit(&mut self, circuit: impl Into<String>) {
        self.params.circuit = circuit.into();
    }

    pub fn set_backend(&mut self, backend: &str) -> CoreResult<()> {
        self.update(|p| p.backend = backend.to_string())
    }

    pub fn set_shots(&mut self, shots: u32) -> CoreResult<()> {
        self.update(|p| p.shots = shots)
    }

    pub fn set_job_count(&mut self, job_count: u32) -> CoreResult<()> {
        self.update(|p| p.job_count = job_count)
    }

    /// Apply every field of `update`, or none of them.
    pub fn apply(&mut self, update: ParamsUpdate) -> CoreResult<()> {
        self.update(|p| {
            if let Some(circuit) = update.circuit {
                p.circuit = circuit;
            }
            if let Some(backend) = update.backend {
                p.backend = backend;
            }
            if let Some(shots) = update.shots {
                p.shots = shots;
            }
            if let Some(job_count) = update.job_count {
                p.job_count = job_count;
            }
        })
    }

    /// Apply `change` only if the resulting parameters stay within bounds.
    fn update(&mut self, change: impl FnOnce(&mut SessionParams)) -> CoreResult<()> {
        let mut params = self.params.clone();
        change(&mut params);
        self.defaults
            .check_request(&params.to_request())
            .map_err(CoreError::InvalidRequest)?;
        self.params = params;
        Ok(())
    }

    /// Request for the current parameters.
    pub fn execution_request(&self) -> ExecutionRequest {
        self.params.to_request()
    }

    pub fn results(&self) -> &[JobResult] {
        &self.results
    }

    pub fn replace_results(&mut self, results: Vec<JobResult>) {
        self.results = results;
    }

    pub fn summary(&self) -> ResultsSummary {
        summarize(&self.results)
    }

    pub fn chat(&self) -> &ChatHistory {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatHistory {
        &mut self.chat
    }

    pub fn run_flag(&self) -> RunFlag {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    /// Drop results and restore default parameters. Chat history is kept.
    pub fn reset(&mut self) {
        self.params = Self::default_params(&self.defaults);
        self.results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ClientStatus;
    use chrono::Local;

    fn session() -> Session {
        Session::new(
            ExecutionConfig::default(),
            ServiceAvailability {
                quantum: ClientStatus::missing(),
                assistant: ClientStatus::missing(),
                validator: ClientStatus::available("qjob-qasm"),
            },
        )
    }

    #[test]
    fn test_new_session_uses_defaults() {
        let s = session();
        assert_eq!(s.params().shots, 1024);
        assert_eq!(s.params().job_count, 10);
        assert_eq!(s.params().backend, "ibm_brisbane");
        assert!(s.circuit().starts_with("OPENQASM 2.0;"));
        assert!(s.results().is_empty());
    }

    #[test]
    fn test_bounds_enforced() {
        let mut s = session();
        assert!(s.set_shots(99).is_err());
        assert!(s.set_shots(10_001).is_err());
        s.set_shots(100).unwrap();
        s.set_shots(10_000).unwrap();
        assert!(s.set_job_count(0).is_err());
        assert!(s.set_job_count(51).is_err());
        s.set_job_count(50).unwrap();
        assert!(s.set_backend("ibm_torino").is_err());
        s.set_backend("ibm_kyoto").unwrap();
        assert_eq!(
            s.execution_request(),
            ExecutionRequest {
                circuit: s.circuit().to_string(),
                backend: "ibm_kyoto".into(),
                shots: 10_000,
                job_count: 50,
            }
        );
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut s = session();
        let err = s.apply(ParamsUpdate {
            circuit: Some("OPENQASM 2.0;".into()),
            shots: Some(5),
            ..Default::default()
        });
        assert!(err.is_err());
        assert!(s.circuit().contains("measure"));

        s.apply(ParamsUpdate {
            backend: Some("ibm_lagos".into()),
            job_count: Some(3),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(s.params().backend, "ibm_lagos");
        assert_eq!(s.params().job_count, 3);
        assert_eq!(s.params().shots, 1024);
    }

    #[test]
    fn test_run_flag_is_exclusive() {
        let s = session();
        let flag = s.run_flag();
        let guard = flag.try_start().unwrap();
        assert!(s.is_running());
        assert!(matches!(flag.try_start(), Err(CoreError::BatchRunning)));
        drop(guard);
        assert!(!s.is_running());
        assert!(flag.try_start().is_ok());
    }

    #[test]
    fn test_reset_keeps_chat() {
        let mut s = session();
        s.set_circuit("OPENQASM 2.0;");
        s.set_shots(500).unwrap();
        s.replace_results(vec![JobResult {
            job_id: "j".into(),
            index: 0,
            label: "quantum_circuit".into(),
            count0: 0,
            count1: 500,
            shots: 500,
            timestamp: Local::now(),
        }]);
        s.chat_mut().push_user("hi");
        assert_eq!(s.summary().total_ones, 500);

        s.reset();
        assert!(s.results().is_empty());
        assert_eq!(s.params().shots, 1024);
        assert!(s.circuit().contains("measure"));
        assert_eq!(s.chat().len(), 1);
    }
}
