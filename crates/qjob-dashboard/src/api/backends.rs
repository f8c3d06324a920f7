//! Backend list and status endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::dto::{BackendList, BackendStatusResponse, QuantumCredentials};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/backends - Backends offered by the panel.
pub async fn list_backends(State(state): State<Arc<AppState>>) -> Json<BackendList> {
    let execution = &state.config.execution;
    Json(BackendList {
        backends: execution.backends.clone(),
        default: execution.default_backend().to_string(),
    })
}

/// POST /api/backends/{name}/status - Ask the remote service about a backend.
pub async fn backend_status(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(creds): Json<QuantumCredentials>,
) -> Result<Json<BackendStatusResponse>, ApiError> {
    if !state.config.execution.has_backend(&name) {
        return Err(ApiError::NotFound(format!("Backend '{name}' not found")));
    }
    let credentials = creds.to_credentials();
    if !credentials.is_present() {
        return Err(ApiError::BadRequest(
            "Please provide IBM Quantum API token".into(),
        ));
    }

    let availability = state.services.backend_status(&credentials, &name).await?;
    Ok(Json(BackendStatusResponse {
        backend: name,
        available: availability.is_available,
        pending_jobs: availability.queue_depth,
        message: availability.to_string(),
    }))
}
