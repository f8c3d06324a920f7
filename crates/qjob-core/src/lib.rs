//! Job automation core for qjob.
//!
//! Ties the parser, the backend abstraction and the assistant together into
//! the operations a control panel needs:
//!
//! | Operation | Entry point |
//! |-----------|-------------|
//! | Validate a circuit | [`validate`] |
//! | Run a batch of jobs | [`Services::run_batch`] / [`run_batch`] |
//! | Summarize and export results | [`summarize`], [`to_csv`], [`export_filename`] |
//! | Query a backend | [`Services::backend_status`] |
//! | Talk to the assistant | [`Services::ask`], [`Services::quick_action`] |
//! | Per-user state | [`Session`] |
//!
//! ```ignore
//! use qjob_core::{Credentials, NoProgress, QjobConfig, Services};
//!
//! let config = QjobConfig::load(None)?;
//! let services = Services::from_config(&config);
//! let session = services.new_session();
//! let outcome = services
//!     .run_batch(
//!         &session.execution_request(),
//!         &Credentials::new(token),
//!         &services.batch_options(),
//!         &NoProgress,
//!     )
//!     .await;
//! ```

pub mod aggregate;
pub mod batch;
pub mod chat;
pub mod config;
pub mod error;
pub mod probe;
pub mod services;
pub mod session;
pub mod validator;

pub use aggregate::{ResultsSummary, TIMESTAMP_FORMAT, export_filename, summarize, to_csv};
pub use batch::{
    BatchOptions, BatchOutcome, BatchProgress, BatchStatus, Credentials, ExecutionRequest,
    FailurePolicy, JobResult, NoProgress, ProgressObserver, run_batch,
};
pub use chat::{ChatEntry, ChatHistory};
pub use config::{
    Bounds, ConfigError, DEFAULT_BACKENDS, DEFAULT_QASM, DashboardConfig, ExecutionConfig,
    QjobConfig,
};
pub use error::{CoreError, CoreResult};
pub use probe::{ClientStatus, CredentialPresence, ServiceAvailability};
pub use services::Services;
pub use session::{ParamsUpdate, RunFlag, RunGuard, Session, SessionParams};
pub use validator::{Validation, validate};
