//! IBM Quantum REST client.
//!
//! Two authentication modes are supported:
//!
//! - **Cloud API key** ([`IbmClient::connect`], [`IbmClient::with_iam_token`]):
//!   the key is exchanged for an IAM bearer token and every request carries
//!   the `Service-CRN` header expected by `quantum.cloud.ibm.com/api`. When
//!   the caller has no CRN, [`quantum_instances`] lists the ones the key can
//!   see.
//! - **Legacy bearer token** ([`IbmClient::new`]): the caller's token is sent
//!   as-is to an explicitly chosen endpoint.
//!
//! Only the calls the batch engine needs are implemented: backend lookup,
//! sampler submission, job status and job results.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;

use crate::error::{IbmError, IbmResult};

/// IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum API endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const GLOBAL_SEARCH_URL: &str = "https://api.global-search-tagging.cloud.ibm.com/v3/resources/search";

/// Global Search query matching IBM Quantum service instances.
const QUANTUM_INSTANCE_QUERY: &str = "service_name:quantum-computing";

const IBM_API_VERSION: &str = "2026-02-01";

/// Cloudflare in front of the API rejects the default reqwest user agent.
const USER_AGENT: &str = concat!("qjob/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// IBM Quantum API client.
pub struct IbmClient {
    client: Client,
    endpoint: String,
    /// Hub/group/project, legacy mode only.
    instance: Option<String>,
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("cloud_api", &self.cloud_api)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

/// Bearer token issued by IBM Cloud IAM for an API key.
pub struct IamToken(String);

impl fmt::Debug for IamToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IamToken([REDACTED])")
    }
}

/// Exchange an IBM Cloud API key for an IAM bearer token.
pub async fn exchange_api_key(api_key: &str) -> IbmResult<IamToken> {
    let iam = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    let response = iam
        .post(IAM_TOKEN_URL)
        .form(&[
            ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
            ("apikey", api_key),
        ])
        .send()
        .await
        .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(IbmError::IamTokenExchange(format!(
            "IAM returned {status}: {body}"
        )));
    }

    let token: IamTokenResponse = response
        .json()
        .await
        .map_err(|e| IbmError::IamTokenExchange(format!("unreadable IAM response: {e}")))?;
    Ok(IamToken(token.access_token))
}

/// Service CRNs of the IBM Quantum instances visible to `token`.
pub async fn quantum_instances(token: &IamToken) -> IbmResult<Vec<String>> {
    let client = build_client(base_headers(&token.0)?)?;
    let response = client
        .post(GLOBAL_SEARCH_URL)
        .json(&serde_json::json!({
            "query": QUANTUM_INSTANCE_QUERY,
            "fields": ["crn"],
        }))
        .send()
        .await?;
    let body = checked(response).await?.text().await?;
    parse_instances(&body)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    crn: String,
}

fn parse_instances(body: &str) -> IbmResult<Vec<String>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .map(|item| item.crn)
        .filter(|crn| crn.starts_with("crn:"))
        .collect())
}

impl IbmClient {
    /// Client for a legacy-style endpoint using a bearer token directly.
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        let headers = base_headers(token)?;
        Ok(Self {
            client: build_client(headers)?,
            endpoint: endpoint.into(),
            instance: None,
            cloud_api: false,
        })
    }

    /// Client for the Cloud API: exchanges `api_key` for an IAM token.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        let token = exchange_api_key(api_key).await?;
        Self::with_iam_token(&token, service_crn)
    }

    /// Client for the Cloud API instance `service_crn`.
    pub fn with_iam_token(token: &IamToken, service_crn: &str) -> IbmResult<Self> {
        let mut headers = base_headers(&token.0)?;
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        Ok(Self {
            client: build_client(headers)?,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            instance: Some(service_crn.to_string()),
            cloud_api: true,
        })
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configuration and status of one backend.
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        if !self.cloud_api {
            let url = format!("{}/v1/backends/{name}", self.endpoint);
            let response = self.client.get(&url).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(IbmError::UnknownBackend(name.to_string()));
            }
            return Ok(checked(response).await?.json().await?);
        }

        let url = format!("{}/v1/backends/{name}/configuration", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::UnknownBackend(name.to_string()));
        }
        let config: BackendConfigResponse = checked(response).await?.json().await?;

        // A missing status document is not fatal; the configuration proved
        // the backend exists.
        let url = format!("{}/v1/backends/{name}/status", self.endpoint);
        let response = self.client.get(&url).send().await?;
        let status = if response.status().is_success() {
            let s: BackendStatusResponse = response.json().await?;
            BackendStatus {
                operational: s.state,
                status_msg: (!s.message.is_empty()).then_some(s.message),
                pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
            }
        } else {
            tracing::warn!(backend = name, status = %response.status(), "backend status unavailable");
            BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: None,
            }
        };

        Ok(BackendInfo {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            status,
            max_shots: config.max_shots,
        })
    }

    /// Submit circuits to the Sampler primitive.
    ///
    /// The Cloud API takes V2 PUBs `[circuit, params, shots]`; the legacy
    /// endpoint takes the V1 `circuits`/`shots` form.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let body = self.sampler_request(backend, circuits, shots);
        let response = self.client.post(&url).json(&body).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    fn sampler_request(&self, backend: &str, circuits: Vec<String>, shots: u32) -> serde_json::Value {
        if self.cloud_api {
            let pubs: Vec<serde_json::Value> = circuits
                .into_iter()
                .map(|c| serde_json::json!([c, {}, shots]))
                .collect();
            serde_json::json!({
                "program_id": "sampler",
                "backend": backend,
                "params": {
                    "version": 2,
                    "pubs": pubs,
                    "options": { "optimization_level": 1 }
                }
            })
        } else {
            let mut request = serde_json::json!({
                "program_id": "sampler",
                "backend": backend,
                "params": { "circuits": circuits, "shots": shots }
            });
            if let Some(hub) = &self.instance {
                request["hub"] = serde_json::json!(hub);
            }
            request
        }
    }

    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{job_id}", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        Ok(checked(response).await?.json().await?)
    }

    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{job_id}/results", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        Ok(checked(response).await?.json().await?)
    }
}

fn base_headers(token: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    let mut auth = header::HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| IbmError::InvalidToken)?;
    auth.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, auth);
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn build_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?)
}

/// Pass successful responses through; turn anything else into [`IbmError::Api`].
async fn checked(response: Response) -> IbmResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> IbmError {
    let (code, message) = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) if !parsed.message.is_empty() => (parsed.code, parsed.message),
        _ if body.trim().is_empty() => (None, status.to_string()),
        _ => (None, body.trim().to_string()),
    };
    IbmError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Cloud API `/backends/{name}/configuration`.
#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: usize,
    #[serde(default)]
    max_shots: Option<u32>,
}

/// Cloud API `/backends/{name}/status`.
#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    length_queue: u64,
}

/// Backend information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    pub name: String,
    pub num_qubits: usize,
    pub status: BackendStatus,
    #[serde(default)]
    pub max_shots: Option<u32>,
}

/// Backend status.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    pub operational: bool,
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub id: String,
    /// Mixed case on the Cloud API (`Completed`), upper case on legacy.
    pub status: String,
    /// Failure details, legacy API.
    #[serde(default)]
    pub error: Option<JobError>,
    /// Failure details, Cloud API.
    #[serde(default)]
    pub state: Option<JobState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    pub fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Failure reason, preferring the Cloud API `state.reason`.
    pub fn error_message(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.clone())
            .or_else(|| self.error.as_ref().map(|e| e.message.clone()))
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    pub results: Vec<SamplerResult>,
}

/// Sampler result for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// V2: register name to per-shot hex samples.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// V1: pre-aggregated counts keyed by hex outcome.
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
    /// V1 fallback: quasi-probability distributions.
    #[serde(default)]
    pub quasi_dists: Option<Vec<HashMap<String, f64>>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Per-shot samples of one classical register, e.g. `["0x0", "0x1"]`.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    pub samples: Vec<String>,
}
