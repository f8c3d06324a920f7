//! Backend abstraction for qjob.
//!
//! Provider adapters implement [`BackendConnector`] and [`Backend`]; the batch
//! engine only ever talks to these traits, which keeps it testable against
//! in-process stubs.
//!
//! ```ignore
//! use qjob_hal::{BackendConfig, BackendConnector};
//!
//! let config = BackendConfig::new("ibm_brisbane").with_token(token);
//! let backend = connector.connect(&config).await?;
//! let job = backend.submit(&circuit, 1024).await?;
//! let result = backend.wait(&job).await?;
//! println!("ones: {}", result.counts.get("1"));
//! ```

pub mod backend;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendConnector, WaitPolicy};
pub use error::{HalError, HalResult};
pub use job::{JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
