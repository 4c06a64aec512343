//! Session lifecycle and input upload handlers.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{extract_pdf_text, is_job_description_empty, normalize_whitespace};
use crate::errors::AppError;
use crate::session::{SessionContext, Slot, SlotEntry};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub has_resume: bool,
    pub resume_chars: usize,
    pub job_description: String,
    /// False when the JD will be treated as absent by the analyzer.
    pub job_description_usable: bool,
    pub slots: HashMap<Slot, SlotEntry>,
}

impl From<SessionContext> for SessionSnapshot {
    fn from(session: SessionContext) -> Self {
        Self {
            session_id: session.id,
            created_at: session.created_at,
            has_resume: session.resume_text.is_some(),
            resume_chars: session.resume().chars().count(),
            job_description_usable: !is_job_description_empty(&session.job_description),
            job_description: session.job_description,
            slots: session.slots,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TextInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub session_id: Uuid,
    pub resume_chars: usize,
}

#[derive(Debug, Serialize)]
pub struct JobDescriptionResponse {
    pub session_id: Uuid,
    pub job_description_usable: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session = state.sessions.create().await;
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
            created_at: session.created_at,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.require(id).await?;
    Ok(Json(session.into()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/resume/pdf
///
/// Multipart upload; the PDF goes in the `file` field.
pub async fn handle_upload_resume_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    state.sessions.require(id).await?;

    let mut pdf: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Input(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            pdf = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Input(format!("Failed to read upload: {e}")))?,
            );
            break;
        }
    }
    let pdf = pdf.ok_or_else(|| AppError::Input("Missing multipart field 'file'".to_string()))?;

    // Extraction is CPU-bound and the parser can panic on hostile input.
    let text = tokio::task::spawn_blocking(move || extract_pdf_text(&pdf))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            AppError::Input("The uploaded file could not be read as a PDF".to_string())
        })??;

    store_resume(&state, id, text).await
}

/// PUT /api/v1/sessions/:id/resume/text
pub async fn handle_put_resume_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TextInput>,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let text = normalize_whitespace(&input.text);
    if text.is_empty() {
        return Err(AppError::Input("Resume text must not be empty".to_string()));
    }
    store_resume(&state, id, text).await
}

/// PUT /api/v1/sessions/:id/job-description
///
/// Any text is accepted; a short or placeholder JD is stored as given and
/// reported as not usable.
pub async fn handle_put_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TextInput>,
) -> Result<Json<JobDescriptionResponse>, AppError> {
    let text = input.text.trim().to_string();
    let usable = !is_job_description_empty(&text);
    if !state.sessions.set_job_description(id, text).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    Ok(Json(JobDescriptionResponse {
        session_id: id,
        job_description_usable: usable,
    }))
}

async fn store_resume(
    state: &AppState,
    id: Uuid,
    text: String,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let resume_chars = text.chars().count();
    if !state.sessions.set_resume_text(id, text).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    info!("Stored {resume_chars} chars of resume text for session {id}");
    Ok(Json(ResumeUploadResponse {
        session_id: id,
        resume_chars,
    }))
}
