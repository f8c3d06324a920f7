//! qjob Dashboard - local web control panel for batch runs.
//!
//! The panel lets an operator:
//!
//! - Edit and validate an OpenQASM 2.0 circuit
//! - Run it as a batch of jobs on an IBM Quantum backend
//! - Inspect and download the counts as CSV
//! - Ask the circuit assistant and load its circuits into the editor
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qjob_core::QjobConfig;
//! use qjob_dashboard::{AppState, create_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = QjobConfig::load(None)?;
//!     let addr = config.bind_address()?;
//!     let app = create_router(Arc::new(AppState::from_config(config)));
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod dto;
pub mod error;
pub mod server;
pub mod state;

pub use dto::{
    BackendStatusResponse, ChatResponse, HealthResponse, ResultsResponse, RunRequest,
    RunResponse, SessionView, StatusResponse,
};
pub use error::ApiError;
pub use server::create_router;
pub use state::AppState;
