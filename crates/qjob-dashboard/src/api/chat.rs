//! Assistant chat endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use qjob_assistant::{AssistantResult, QuickAction};
use qjob_core::{ChatEntry, validate};

use crate::dto::{ApplyResponse, ChatRequest, ChatResponse, QuickActionRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/chat - Conversation so far.
pub async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<ChatEntry>> {
    Json(state.session.read().await.chat().entries().to_vec())
}

/// DELETE /api/chat - Clear the conversation.
pub async fn clear(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.write().await.chat_mut().clear();
    StatusCode::NO_CONTENT
}

/// POST /api/chat - Ask the assistant.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".into()));
    }
    state.session.write().await.chat_mut().push_user(req.prompt.clone());
    let reply = state.services.ask(&req.prompt, &req.groq_api_key).await;
    record(&state, reply).await
}

/// POST /api/chat/quick/{action} - Send a canned prompt.
pub async fn quick_action(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
    Json(req): Json<QuickActionRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let action: QuickAction = action.parse()?;
    state
        .session
        .write()
        .await
        .chat_mut()
        .push_user(action.prompt());
    let reply = state.services.quick_action(action, &req.groq_api_key).await;
    record(&state, reply).await
}

/// Append the reply (or its error) to the history, then answer the caller.
async fn record(
    state: &AppState,
    reply: AssistantResult<String>,
) -> Result<Json<ChatResponse>, ApiError> {
    let extract = &state.config.assistant.extract;
    let entry = {
        let mut session = state.session.write().await;
        session.chat_mut().record(&reply, extract);
        session.chat().entries().last().cloned()
    };

    let text = reply?;
    let entry = entry.ok_or_else(|| ApiError::Internal("chat history is empty".into()))?;
    Ok(Json(ChatResponse {
        reply: entry,
        circuit: state.services.assistant().extract_circuit(&text),
    }))
}

/// POST /api/chat/apply - Load the latest circuit from the chat into the editor.
pub async fn apply(State(state): State<Arc<AppState>>) -> Result<Json<ApplyResponse>, ApiError> {
    let mut session = state.session.write().await;
    let circuit = session
        .chat()
        .latest_circuit(&state.config.assistant.extract)
        .ok_or_else(|| ApiError::NotFound("No circuit in the conversation".into()))?;

    let validation = validate(&circuit);
    session.set_circuit(circuit.clone());
    tracing::info!(valid = validation.ok, "applied circuit from chat");

    Ok(Json(ApplyResponse {
        circuit,
        valid: validation.ok,
        detail: validation.detail,
    }))
}
