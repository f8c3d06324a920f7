//! Results endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Local;
use qjob_core::{export_filename, to_csv};

use crate::dto::ResultsResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/results - Records of the latest batch plus totals.
pub async fn get_results(State(state): State<Arc<AppState>>) -> Json<ResultsResponse> {
    let session = state.session.read().await;
    Json(ResultsResponse {
        results: session.results().to_vec(),
        summary: session.summary(),
    })
}

/// GET /api/results/csv - CSV download named after the capture time.
pub async fn download_csv(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.session.read().await;
    if session.results().is_empty() {
        return Err(ApiError::NotFound("No results to export".into()));
    }
    let csv = to_csv(session.results())?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(Local::now()));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
