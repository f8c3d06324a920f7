//! Health, status and configuration endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use qjob_assistant::QuickAction;
use qjob_core::CredentialPresence;

use crate::dto::{ConfigResponse, HealthResponse, StatusResponse};
use crate::state::AppState;

/// Header carrying the IBM Quantum token, checked for presence only.
pub const QUANTUM_TOKEN_HEADER: &str = "x-ibm-quantum-token";
/// Header carrying the Groq API key, checked for presence only.
pub const ASSISTANT_KEY_HEADER: &str = "x-groq-api-key";

/// GET /api/health - Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// GET /api/status - Client availability and credential presence.
pub async fn status(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<StatusResponse> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let running = state.session.read().await.is_running();

    Json(StatusResponse {
        clients: state.services.capabilities().clone(),
        credentials: CredentialPresence::new(
            header(QUANTUM_TOKEN_HEADER),
            header(ASSISTANT_KEY_HEADER),
        ),
        running,
    })
}

/// GET /api/config - Defaults, bounds and backend list.
pub async fn config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        execution: state.config.execution.clone(),
        assistant_model: state.config.assistant.model.clone(),
        quick_actions: QuickAction::ALL.into_iter().map(Into::into).collect(),
    })
}
