//! Fallback Orchestrator for the Analyzer stage.
//!
//! ```text
//! Initial ──valid──────────────────────────────▶ Done(Targeted)
//!    │ declined, JD-related
//!    ▼
//! JdRelaxed ──valid────────────────────────────▶ Done(General)
//!    │ declined / invalid / transport failure
//!    ▼
//! StrictJson ──valid───────────────────────────▶ Done(General)
//!    └─otherwise──────────────────────────────▶ ModelDeclined(initial reason)
//!
//! Initial ──invalid, no envelope──▶ StrictJson (JD kept)
//!    ──valid──▶ Done(Targeted)   ──otherwise──▶ SchemaValidation
//! ```
//!
//! Every arrow that leaves a state costs exactly one logical completion call
//! (each of which may retry internally). Configuration errors abort the
//! cascade from any state.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::analysis::prompts::JD_ABSENT_INSTRUCTION;
use crate::documents::normalize_job_description;
use crate::errors::AppError;
use crate::llm_client::prompts::STRICT_JSON_INSTRUCTION;
use crate::llm_client::{CompletionClient, LlmError, OutputMode};
use crate::models::Stage;
use crate::prompts::{self, BuiltPrompt, PromptInputs};
use crate::validation::{self, Schema, Verdict};

pub const NOTE_JD_ABSENT: &str =
    "The job description is missing or too short, so a general resume analysis was performed.";
pub const NOTE_JD_UNUSABLE: &str =
    "The model could not use the job description, so a general resume analysis was performed.";

/// Whether the report was produced against the job description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Targeted,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub report: Map<String, Value>,
    pub mode: AnalysisMode,
    /// Logical completion calls made, 1 to 3.
    pub attempts: u32,
    /// Informational message for General results.
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CascadeState {
    Initial,
    JdRelaxed,
    StrictJson,
}

/// One run of the cascade for a single analysis request.
pub struct Cascade<'a> {
    client: &'a CompletionClient,
    temperature: Option<f32>,
    attempts: u32,
}

impl<'a> Cascade<'a> {
    pub fn new(client: &'a CompletionClient, temperature: Option<f32>) -> Self {
        Self {
            client,
            temperature,
            attempts: 0,
        }
    }

    /// `raw_job_description` is the user's text; it is normalized here.
    pub async fn run(
        mut self,
        resume_text: &str,
        raw_job_description: &str,
    ) -> Result<AnalysisOutcome, AppError> {
        let job_description = normalize_job_description(raw_job_description);
        let jd_absent = job_description.is_empty();

        let targeted = prompts::build(
            Stage::Analyzer,
            &PromptInputs {
                resume_text,
                job_description,
                ..Default::default()
            },
        )?;
        let general = prompts::build(
            Stage::Analyzer,
            &PromptInputs {
                resume_text,
                job_description: "",
                ..Default::default()
            },
        )?;

        let initial = self.call(CascadeState::Initial, &targeted).await?;

        match validation::assess(Schema::Analysis, &initial) {
            Verdict::Valid => Ok(self.finish(initial, AnalysisMode::Targeted, None)),

            Verdict::Declined(envelope) => {
                let classification = envelope.classify();
                let initial_reason = envelope.message();
                info!(
                    "Analyzer declined ({:?}, authoritative={})",
                    classification.reason, classification.authoritative
                );
                if !classification.reason.is_job_description_related() {
                    warn!("Analyzer declined: {initial_reason}");
                    return Err(AppError::ModelDeclined(initial_reason));
                }

                let note = if jd_absent {
                    NOTE_JD_ABSENT
                } else {
                    NOTE_JD_UNUSABLE
                };

                if let Some(report) = self.try_general(CascadeState::JdRelaxed, &general).await? {
                    return Ok(self.finish(report, AnalysisMode::General, Some(note)));
                }
                if let Some(report) = self.try_general(CascadeState::StrictJson, &general).await? {
                    return Ok(self.finish(report, AnalysisMode::General, Some(note)));
                }

                warn!(
                    "Analyzer fallback exhausted after {} calls; surfacing initial reason",
                    self.attempts
                );
                Err(AppError::ModelDeclined(initial_reason))
            }

            Verdict::Invalid { missing } => {
                warn!("Analyzer response missing keys {missing:?}; retrying in strict mode");
                match self.call(CascadeState::StrictJson, &targeted).await {
                    Ok(report) if validation::assess(Schema::Analysis, &report) == Verdict::Valid => {
                        Ok(self.finish(report, AnalysisMode::Targeted, None))
                    }
                    Err(LlmError::Configuration(e)) => Err(LlmError::Configuration(e).into()),
                    Ok(_) | Err(_) => Err(AppError::SchemaValidation(
                        "Analyzer response does not match the report schema".to_string(),
                    )),
                }
            }
        }
    }

    /// One General-mode step. `Ok(None)` moves the cascade on.
    async fn try_general(
        &mut self,
        state: CascadeState,
        prompt: &BuiltPrompt,
    ) -> Result<Option<Map<String, Value>>, AppError> {
        match self.call(state, prompt).await {
            Ok(report) => match validation::assess(Schema::Analysis, &report) {
                Verdict::Valid => Ok(Some(report)),
                Verdict::Declined(envelope) => {
                    warn!("{state:?} declined again: {}", envelope.message());
                    Ok(None)
                }
                Verdict::Invalid { missing } => {
                    warn!("{state:?} response missing keys {missing:?}");
                    Ok(None)
                }
            },
            Err(LlmError::Configuration(e)) => Err(LlmError::Configuration(e).into()),
            Err(e) => {
                warn!("{state:?} completion failed: {e}");
                Ok(None)
            }
        }
    }

    async fn call(
        &mut self,
        state: CascadeState,
        prompt: &BuiltPrompt,
    ) -> Result<Map<String, Value>, LlmError> {
        let preamble: &[&str] = match state {
            CascadeState::Initial => &[],
            CascadeState::JdRelaxed => &[JD_ABSENT_INSTRUCTION],
            CascadeState::StrictJson => &[STRICT_JSON_INSTRUCTION],
        };
        let request = self.client.request_for(
            Stage::Analyzer,
            OutputMode::Json,
            prompt.to_messages(preamble),
            self.temperature,
        )?;

        self.attempts += 1;
        info!("Analyzer call {} ({state:?})", self.attempts);
        Ok(self.client.complete(&request).await?.into_json())
    }

    fn finish(
        self,
        report: Map<String, Value>,
        mode: AnalysisMode,
        note: Option<&str>,
    ) -> AnalysisOutcome {
        info!(
            "Analysis completed: mode={mode:?}, attempts={}",
            self.attempts
        );
        AnalysisOutcome {
            report,
            mode,
            attempts: self.attempts,
            note: note.map(str::to_string),
        }
    }
}
