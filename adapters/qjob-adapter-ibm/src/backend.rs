//! IBM Quantum backend implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use qjob_hal::{
    Backend, BackendAvailability, Counts, ExecutionResult, HalError, HalResult, JobId, JobStatus,
    WaitPolicy,
};
use qjob_ir::Circuit;
use qjob_qasm::emit_qasm3;
use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, RwLock};

use crate::api::{BackendInfo, IbmClient, JobResultResponse, SamplerResult};
use crate::error::{IbmError, IbmResult};

/// How long backend info is cached before it is fetched again.
const BACKEND_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// IBM queues are measured in minutes; polling faster only burns rate limit.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Fallback when neither metadata nor the request recorded the shot count.
const DEFAULT_SHOTS: u64 = 1024;

/// Classical registers of a submitted circuit, in declaration order.
type RegisterLayout = Vec<(String, usize)>;

/// One named IBM Quantum device reached through an authenticated client.
pub struct IbmBackend {
    client: Arc<IbmClient>,
    target: String,
    backend_info: RwLock<Option<(BackendInfo, Instant)>>,
    /// Register layout per submitted job, used to size result bitstrings.
    layouts: Mutex<FxHashMap<JobId, (RegisterLayout, u32)>>,
}

impl std::fmt::Debug for IbmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbmBackend")
            .field("client", &self.client)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl IbmBackend {
    pub fn new(client: Arc<IbmClient>, target: impl Into<String>) -> Self {
        Self {
            client,
            target: target.into(),
            backend_info: RwLock::new(None),
            layouts: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Backend information, refreshed once the cached copy is older than the TTL.
    pub async fn backend_info(&self) -> IbmResult<BackendInfo> {
        {
            let cached = self.backend_info.read().await;
            if let Some((info, fetched_at)) = cached.as_ref() {
                if fetched_at.elapsed() < BACKEND_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_backend(&self.target).await?;
        *self.backend_info.write().await = Some((info.clone(), Instant::now()));
        Ok(info)
    }

    fn check_fits(circuit: &Circuit, info: &BackendInfo) -> IbmResult<()> {
        if circuit.num_qubits() > info.num_qubits {
            return Err(IbmError::TooManyQubits {
                required: circuit.num_qubits(),
                available: info.num_qubits,
            });
        }
        Ok(())
    }
}

/// Fold sampler output into bitstring counts.
///
/// V2 results carry one hex sample per shot for each classical register.
/// Registers are joined per shot with the last declared register leftmost,
/// each padded to its declared width. Registers absent from `layout` fall
/// back to the width of their largest sample.
pub(crate) fn results_to_counts(
    results: &JobResultResponse,
    layout: &[(String, usize)],
    shots: u64,
) -> Counts {
    let Some(result) = results.results.first() else {
        return Counts::new();
    };

    if let Some(data) = &result.data {
        return sampled_counts(data, layout);
    }

    let width: usize = layout.iter().map(|(_, size)| size).sum();
    if let Some(raw) = &result.counts {
        return raw
            .iter()
            .map(|(outcome, &count)| (hex_to_binary(outcome, width), count))
            .collect();
    }

    quasi_counts(result, width, shots)
}

fn sampled_counts(
    data: &std::collections::HashMap<String, crate::api::ClassicalRegisterData>,
    layout: &[(String, usize)],
) -> Counts {
    let mut registers: Vec<(&[String], usize)> = layout
        .iter()
        .filter_map(|(name, size)| data.get(name).map(|d| (d.samples.as_slice(), *size)))
        .collect();

    if registers.is_empty() {
        let mut names: Vec<&String> = data.keys().collect();
        names.sort();
        registers = names
            .into_iter()
            .map(|name| {
                let samples = data[name].samples.as_slice();
                (samples, infer_bit_width(samples))
            })
            .collect();
    }

    let shots = registers.iter().map(|(s, _)| s.len()).min().unwrap_or(0);
    (0..shots)
        .map(|shot| {
            let bitstring: String = registers
                .iter()
                .rev()
                .map(|(samples, width)| hex_to_binary(&samples[shot], *width))
                .collect();
            (bitstring, 1)
        })
        .collect()
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quasi_counts(result: &SamplerResult, width: usize, shots: u64) -> Counts {
    let shots = result
        .metadata
        .as_ref()
        .and_then(|m| m.get("shots"))
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(shots);

    let Some(dist) = result.quasi_dists.as_ref().and_then(|d| d.first()) else {
        return Counts::new();
    };

    dist.iter()
        .filter_map(|(outcome, &prob)| {
            let count = (prob * shots as f64).max(0.0).round() as u64;
            (count > 0).then(|| (hex_to_binary(outcome, width), count))
        })
        .collect()
}

/// Bits needed for the largest sample; at least one.
fn infer_bit_width(samples: &[String]) -> usize {
    let max = samples
        .iter()
        .filter_map(|s| u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok())
        .max()
        .unwrap_or(0);
    (64 - max.leading_zeros() as usize).max(1)
}

/// Hex outcome to a binary string padded to `width`.
///
/// A zero width falls back to four bits per hex digit. Values that are not
/// hex are assumed to already be binary.
fn hex_to_binary(hex: &str, width: usize) -> String {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    match u64::from_str_radix(digits, 16) {
        Ok(value) => {
            let width = if width > 0 { width } else { digits.len() * 4 };
            format!("{value:0>width$b}")
        }
        Err(_) => digits.to_string(),
    }
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.target
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        let info = self.backend_info().await?;
        if info.status.operational {
            Ok(BackendAvailability::available(
                info.status.pending_jobs.unwrap_or(0),
            ))
        } else {
            Ok(BackendAvailability::unavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "backend offline".to_string()),
            ))
        }
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<()> {
        let info = self.backend_info().await?;
        Self::check_fits(circuit, &info)?;
        Ok(())
    }

    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        let info = self.backend_info().await?;
        Self::check_fits(circuit, &info)?;
        if let Some(max) = info.max_shots.filter(|max| shots > *max) {
            return Err(HalError::InvalidShots(format!(
                "{shots} exceeds the {} limit of {max}",
                self.target
            )));
        }

        let qasm = emit_qasm3(circuit);
        let response = self
            .client
            .submit_sampler_job(&self.target, vec![qasm], shots)
            .await
            .map_err(|e| match e {
                IbmError::Api { .. } if !e.is_auth_failure() => {
                    HalError::SubmissionFailed(e.to_string())
                }
                other => other.into(),
            })?;

        let job_id = JobId::new(response.id);
        let layout = circuit
            .cregs()
            .iter()
            .map(|r| (r.name.clone(), r.size as usize))
            .collect();
        self.layouts
            .lock()
            .await
            .insert(job_id.clone(), (layout, shots));

        tracing::debug!(backend = %self.target, job_id = %job_id, shots, "submitted sampler job");
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.get_job_status(job_id.as_str()).await?;

        Ok(match status.normalized_status().as_str() {
            "QUEUED" => JobStatus::Queued,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" | "ERROR" => JobStatus::Failed(
                status
                    .error_message()
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            "CANCELLED" => JobStatus::Cancelled,
            // VALIDATING, RUNNING and anything newer the API invents.
            _ => JobStatus::Running,
        })
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self.client.get_job_status(job_id.as_str()).await?;
        if status.is_failed() {
            return Err(HalError::JobFailed(
                status
                    .error_message()
                    .unwrap_or_else(|| "job failed".to_string()),
            ));
        }
        if status.is_cancelled() {
            return Err(HalError::JobCancelled);
        }
        if !status.is_completed() {
            return Err(HalError::Backend(format!("job {job_id} not yet completed")));
        }

        let results = self.client.get_job_results(job_id.as_str()).await?;
        let (layout, shots) = self
            .layouts
            .lock()
            .await
            .remove(job_id)
            .unwrap_or_default();

        let requested = if shots == 0 {
            DEFAULT_SHOTS
        } else {
            u64::from(shots)
        };
        let counts = results_to_counts(&results, &layout, requested);
        let shots = if shots == 0 {
            u32::try_from(counts.total_shots()).unwrap_or(u32::MAX)
        } else {
            shots
        };
        Ok(ExecutionResult::new(counts, shots))
    }

    fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval: POLL_INTERVAL,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClassicalRegisterData;
    use std::collections::HashMap;

    fn v2(registers: &[(&str, &[&str])]) -> JobResultResponse {
        let data = registers
            .iter()
            .map(|(name, samples)| {
                (
                    (*name).to_string(),
                    ClassicalRegisterData {
                        samples: samples.iter().map(|s| (*s).to_string()).collect(),
                    },
                )
            })
            .collect();
        JobResultResponse {
            results: vec![SamplerResult {
                data: Some(data),
                counts: None,
                quasi_dists: None,
                metadata: None,
            }],
        }
    }

    #[test]
    fn test_hex_to_binary() {
        assert_eq!(hex_to_binary("0x0", 0), "0000");
        assert_eq!(hex_to_binary("0xf", 0), "1111");
        assert_eq!(hex_to_binary("0x1", 1), "1");
        assert_eq!(hex_to_binary("0x3", 4), "0011");
        assert_eq!(hex_to_binary("10", 2), "10000");
        assert_eq!(hex_to_binary("zz", 2), "zz");
    }

    #[test]
    fn test_single_bit_register_uses_declared_width() {
        let results = v2(&[("c", &["0x1", "0x1", "0x0", "0x1"])]);
        let counts = results_to_counts(&results, &[("c".into(), 1)], 4);
        assert_eq!(counts.get("1"), 3);
        assert_eq!(counts.get("0"), 1);
    }

    #[test]
    fn test_all_zero_samples_keep_width() {
        let results = v2(&[("c", &["0x0", "0x0"])]);
        let counts = results_to_counts(&results, &[("c".into(), 2)], 2);
        assert_eq!(counts.get("00"), 2);
    }

    #[test]
    fn test_registers_joined_last_declared_leftmost() {
        let results = v2(&[("a", &["0x1", "0x0"]), ("b", &["0x2", "0x3"])]);
        let layout = vec![("a".to_string(), 1), ("b".to_string(), 2)];
        let counts = results_to_counts(&results, &layout, 2);
        assert_eq!(counts.get("101"), 1);
        assert_eq!(counts.get("110"), 1);
        assert_eq!(counts.total_shots(), 2);
    }

    #[test]
    fn test_unknown_layout_infers_width() {
        let results = v2(&[("meas", &["0x0", "0x3", "0x3"])]);
        let counts = results_to_counts(&results, &[], 3);
        assert_eq!(counts.get("11"), 2);
        assert_eq!(counts.get("00"), 1);
    }

    #[test]
    fn test_v1_counts_and_quasi_dists() {
        let mut raw = HashMap::new();
        raw.insert("0x0".to_string(), 500);
        raw.insert("0x1".to_string(), 524);
        let results = JobResultResponse {
            results: vec![SamplerResult {
                data: None,
                counts: Some(raw),
                quasi_dists: None,
                metadata: None,
            }],
        };
        let counts = results_to_counts(&results, &[("c".into(), 1)], 1024);
        assert_eq!(counts.get("1"), 524);

        let mut dist = HashMap::new();
        dist.insert("0x1".to_string(), 0.75);
        dist.insert("0x0".to_string(), 0.25);
        let results = JobResultResponse {
            results: vec![SamplerResult {
                data: None,
                counts: None,
                quasi_dists: Some(vec![dist]),
                metadata: Some(serde_json::json!({"shots": 400})),
            }],
        };
        let counts = results_to_counts(&results, &[("c".into(), 1)], 1024);
        assert_eq!(counts.get("1"), 300);
        assert_eq!(counts.get("0"), 100);
    }

    #[test]
    fn test_empty_results() {
        let results = JobResultResponse { results: vec![] };
        assert!(results_to_counts(&results, &[], 10).is_empty());
    }
}
