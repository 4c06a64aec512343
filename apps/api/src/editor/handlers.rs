use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::editor::{run_editor, EditorRun};
use crate::errors::AppError;
use crate::models::ResumeVersion;
use crate::session::Slot;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EditorRequest {
    #[serde(default)]
    pub version: ResumeVersion,
    pub temperature: Option<f32>,
}

/// POST /api/v1/sessions/:id/editor
pub async fn handle_run_editor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<EditorRequest>>,
) -> Result<Json<EditorRun>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session = state.sessions.require(id).await?;

    let run = run_editor(&state.client, &session, request.version, request.temperature).await?;

    if !state
        .sessions
        .write_slot(id, Slot::EditorOutput, Value::String(run.markdown.clone()))
        .await
    {
        warn!("Session {id} was removed while the editor was running");
    }
    Ok(Json(run))
}
