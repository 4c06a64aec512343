//! Axum route handlers for the Analyzer stage.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::analysis::{run_analysis, AnalysisRun};
use crate::errors::AppError;
use crate::session::Slot;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    pub temperature: Option<f32>,
}

/// POST /api/v1/sessions/:id/analysis
///
/// Runs the analyzer (with fallbacks) and stores the report in the
/// `analysis_json` slot. The body is optional.
pub async fn handle_run_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<AnalysisRequest>>,
) -> Result<Json<AnalysisRun>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session = state.sessions.require(id).await?;

    let run = run_analysis(&state.client, &session, request.temperature).await?;

    if !state
        .sessions
        .write_slot(id, Slot::AnalysisJson, run.raw.clone())
        .await
    {
        warn!("Session {id} was removed while the analysis was running");
    }
    Ok(Json(run))
}

/// GET /api/v1/sessions/:id/analysis/raw
pub async fn handle_get_raw_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.require(id).await?;
    session
        .slot(Slot::AnalysisJson)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No analysis has been run for this session".to_string()))
}
