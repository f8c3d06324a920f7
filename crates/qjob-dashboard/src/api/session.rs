//! Session endpoints.

use std::sync::Arc;

use axum::{Json, extract::State};
use qjob_core::{ParamsUpdate, Session};

use crate::dto::SessionView;
use crate::error::ApiError;
use crate::state::AppState;

fn view(session: &Session) -> SessionView {
    SessionView {
        params: session.params().clone(),
        running: session.is_running(),
        result_count: session.results().len(),
        chat_length: session.chat().len(),
    }
}

/// GET /api/session - Current circuit and run parameters.
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(view(&*state.session.read().await))
}

/// PUT /api/session - Update circuit text, backend, shots or job count.
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ParamsUpdate>,
) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session.write().await;
    session.apply(update)?;
    Ok(Json(view(&session)))
}

/// POST /api/session/reset - Clear results and restore defaults.
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session.write().await;
    if session.is_running() {
        return Err(ApiError::Conflict(
            "cannot reset while a batch is running".into(),
        ));
    }
    session.reset();
    tracing::info!("session reset");
    Ok(Json(view(&session)))
}
