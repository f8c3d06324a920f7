//! IBM Quantum adapter for qjob.
//!
//! Submits circuits to IBM Quantum through the Sampler primitive and folds
//! the returned samples into [`qjob_hal::Counts`].
//!
//! # Authentication
//!
//! | `BackendConfig` | Mode |
//! |-----------------|------|
//! | `token` only | IBM Cloud API key; the instance CRN is looked up |
//! | `token` + `instance = "crn:..."` | IBM Cloud API key for that instance |
//! | `token` + `endpoint` | bearer token against `endpoint` |
//! | `token` + `instance = "hub/group/project"` | bearer token against the legacy endpoint (or `endpoint`) |
//!
//! Credentials always come from the caller; nothing is read from the
//! environment here.
//!
//! ```ignore
//! use qjob_adapter_ibm::IbmConnector;
//! use qjob_hal::{BackendConfig, BackendConnector};
//!
//! let config = BackendConfig::new("ibm_brisbane").with_token(token);
//! let backend = IbmConnector::new().connect(&config).await?;
//! println!("{}", backend.availability().await?);
//! ```

mod api;
mod backend;
mod connector;
mod error;

pub use api::{
    BackendInfo, BackendStatus, ClassicalRegisterData, DEFAULT_ENDPOINT, IbmClient, JobError,
    JobResultResponse, JobState, JobStatusResponse, LEGACY_ENDPOINT, SamplerResult, SubmitResponse,
    IamToken, exchange_api_key, quantum_instances,
};
pub use backend::IbmBackend;
pub use connector::IbmConnector;
pub use error::{IbmError, IbmResult};
