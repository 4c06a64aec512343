//! Axum route handlers for the salary estimators.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::prompts::RoleSalaryInputs;
use crate::salary::{run_role_salary_estimate, run_salary_estimate, SalaryRun};
use crate::session::Slot;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SalaryRequest {
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct RoleSalaryRequest {
    pub role_title: String,
    #[serde(default)]
    pub city: String,
    pub seniority: Option<String>,
    pub resume_summary: Option<String>,
    pub temperature: Option<f32>,
}

/// POST /api/v1/sessions/:id/salary
///
/// Infers suitable roles from the session resume and estimates ranges.
pub async fn handle_salary_estimate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<SalaryRequest>>,
) -> Result<Json<SalaryRun>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session = state.sessions.require(id).await?;

    let run = run_salary_estimate(&state.client, &session, request.temperature).await?;

    if !state
        .sessions
        .write_slot(id, Slot::SalaryJson, run.raw.clone())
        .await
    {
        warn!("Session {id} was removed while the salary estimate was running");
    }
    Ok(Json(run))
}

/// POST /api/v1/sessions/:id/salary/role
///
/// Estimate for an explicit role and city; the session JD is passed along
/// when present.
pub async fn handle_role_salary_estimate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleSalaryRequest>,
) -> Result<Json<SalaryRun>, AppError> {
    let session = state.sessions.require(id).await?;

    let inputs = RoleSalaryInputs {
        role_title: &request.role_title,
        city: &request.city,
        seniority: request.seniority.as_deref(),
        resume_summary: request.resume_summary.as_deref(),
        job_description: &session.job_description,
    };
    let run = run_role_salary_estimate(&state.client, &inputs, request.temperature).await?;

    if !state
        .sessions
        .write_slot(id, Slot::RoleSalaryJson, run.raw.clone())
        .await
    {
        warn!("Session {id} was removed while the role estimate was running");
    }
    Ok(Json(run))
}
