//! Batch execution endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use qjob_core::{BatchProgress, summarize};
use uuid::Uuid;

use crate::dto::{RunRequest, RunResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/run - Run a batch with the session parameters.
///
/// Returns 409 while another batch is running. A batch that fails remotely
/// still answers 200; the outcome carries the error text.
pub async fn run(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let credentials = req.credentials.to_credentials();
    if !credentials.is_present() {
        return Err(ApiError::BadRequest(
            "Please provide IBM Quantum API token".into(),
        ));
    }

    let flag = state.session.read().await.run_flag();
    let _guard = flag.try_start()?;

    let request = {
        let mut session = state.session.write().await;
        session.apply(req.params)?;
        session.execution_request()
    };

    let mut options = state.services.batch_options();
    if let Some(policy) = req.failure_policy {
        options.policy = policy;
    }

    let run_id = Uuid::new_v4();
    tracing::info!(
        %run_id,
        backend = %request.backend,
        shots = request.shots,
        jobs = request.job_count,
        "run started"
    );

    let observer = |p: BatchProgress<'_>| {
        tracing::info!(%run_id, job_id = p.job_id, "job {}/{} completed", p.completed(), p.total);
    };
    let outcome = state
        .services
        .run_batch(&request, &credentials, &options, &observer)
        .await;

    // A failed batch leaves earlier results in place unless it kept partial ones.
    if outcome.is_success() || !outcome.results.is_empty() {
        state
            .session
            .write()
            .await
            .replace_results(outcome.results.clone());
    }

    let summary = summarize(&outcome.results);
    Ok(Json(RunResponse {
        run_id,
        outcome,
        summary,
    }))
}
