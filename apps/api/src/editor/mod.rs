//! Editor stage: rewrites the resume in Markdown using the analyzer report.

pub mod handlers;
pub mod prompts;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{parse_json_object, CompletionClient, OutputMode};
use crate::models::{ResumeVersion, Stage};
use crate::prompts::{self as prompt_builder, PromptInputs};
use crate::session::{SessionContext, Slot};
use crate::validation::ErrorEnvelope;

pub const NOTE_NO_ANALYSIS: &str =
    "No analysis was found for this session; run the analyzer first for better edits.";

#[derive(Debug, Clone, Serialize)]
pub struct EditorRun {
    pub version: ResumeVersion,
    pub note: Option<String>,
    pub markdown: String,
}

pub async fn run_editor(
    client: &CompletionClient,
    session: &SessionContext,
    version: ResumeVersion,
    temperature: Option<f32>,
) -> Result<EditorRun, AppError> {
    let resume_text = session.resume();
    if resume_text.trim().is_empty() {
        return Err(AppError::Input(
            "A resume is required before running the editor".to_string(),
        ));
    }

    let prior = session.slot(Slot::AnalysisJson).map(|v| v.to_string());
    let note = prior.is_none().then(|| {
        warn!("Editor running without a prior analysis for session {}", session.id);
        NOTE_NO_ANALYSIS.to_string()
    });

    let prompt = prompt_builder::build(
        Stage::Editor,
        &PromptInputs {
            resume_text,
            job_description: session.job_description.trim(),
            prior_output: prior.as_deref(),
            resume_version: version,
        },
    )?;
    let request = client.request_for(
        Stage::Editor,
        OutputMode::Text,
        prompt.to_messages(&[]),
        temperature,
    )?;

    let output = client.complete(&request).await?.into_text();

    if let Some(message) = declined(&output) {
        warn!("Editor declined: {message}");
        return Err(AppError::ModelDeclined(message));
    }
    if output.trim().is_empty() {
        return Err(AppError::SchemaValidation(
            "Editor returned an empty response".to_string(),
        ));
    }

    info!("Editor produced {} chars ({})", output.len(), version.as_str());
    Ok(EditorRun {
        version,
        note,
        markdown: output,
    })
}

/// The editor answers in Markdown; a JSON object with an `error` key is a
/// refusal. Its `details` are preferred over `reason`.
fn declined(output: &str) -> Option<String> {
    let trimmed = output.trim();
    if !trimmed.starts_with('{') {
        return None;
    }

    let map = parse_json_object(trimmed);
    match ErrorEnvelope::detect(&map) {
        Some(envelope) => Some(
            envelope
                .details
                .clone()
                .or_else(|| envelope.reason.clone())
                .unwrap_or_else(|| envelope.message()),
        ),
        // Looks like an error object but is not valid JSON.
        None if map.is_empty() && trimmed.starts_with("{\"error\"") => Some(trimmed.to_string()),
        None => None,
    }
}
