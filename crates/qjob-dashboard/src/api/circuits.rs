//! Circuit validation endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use qjob_core::{Validation, validate};

use crate::dto::ValidateRequest;
use crate::state::AppState;

/// POST /api/circuits/validate - Parse a circuit and report qubits and depth.
///
/// Invalid circuits are a normal answer (`ok: false`), not an HTTP error.
pub async fn validate_circuit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateRequest>,
) -> Json<Validation> {
    let source = match req.qasm {
        Some(qasm) => qasm,
        None => state.session.read().await.circuit().to_string(),
    };
    Json(validate(&source))
}
