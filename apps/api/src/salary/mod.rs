//! Salary Estimator stage: market ranges in RUB/month.
//!
//! Two entry points share one call-and-validate loop: an estimate inferred
//! from the resume (roles plus ranges) and an estimate for an explicitly
//! named role and city. A schema miss gets exactly one strict-mode retry.

pub mod handlers;
pub mod prompts;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::documents::normalize_job_description;
use crate::errors::AppError;
use crate::llm_client::prompts::STRICT_JSON_INSTRUCTION;
use crate::llm_client::{CompletionClient, OutputMode};
use crate::models::Stage;
use crate::prompts::{
    self as prompt_builder, BuiltPrompt, PromptInputs, RoleSalaryInputs,
};
use crate::report::{self, Document};
use crate::session::SessionContext;
use crate::validation::{self, Schema, Verdict};

#[derive(Debug, Clone, Serialize)]
pub struct SalaryRun {
    pub attempts: u32,
    pub document: Document,
    pub markdown: String,
    pub raw: Value,
}

/// Estimate inferred from the session's resume and job description.
pub async fn run_salary_estimate(
    client: &CompletionClient,
    session: &SessionContext,
    temperature: Option<f32>,
) -> Result<SalaryRun, AppError> {
    let resume_text = session.resume();
    if resume_text.trim().is_empty() {
        return Err(AppError::Input(
            "A resume is required before estimating salary".to_string(),
        ));
    }

    let prompt = prompt_builder::build(
        Stage::SalaryEstimator,
        &PromptInputs {
            resume_text,
            job_description: normalize_job_description(&session.job_description),
            ..Default::default()
        },
    )?;
    estimate(client, Schema::SalaryEstimate, &prompt, temperature).await
}

/// Estimate for a named role. Only `role_title` is mandatory.
pub async fn run_role_salary_estimate(
    client: &CompletionClient,
    inputs: &RoleSalaryInputs<'_>,
    temperature: Option<f32>,
) -> Result<SalaryRun, AppError> {
    if inputs.role_title.trim().is_empty() {
        return Err(AppError::Input("role_title must not be empty".to_string()));
    }

    let prompt = prompt_builder::build_role_salary(&RoleSalaryInputs {
        job_description: normalize_job_description(inputs.job_description),
        ..*inputs
    })?;
    estimate(client, Schema::RoleSalaryEstimate, &prompt, temperature).await
}

async fn estimate(
    client: &CompletionClient,
    schema: Schema,
    prompt: &BuiltPrompt,
    temperature: Option<f32>,
) -> Result<SalaryRun, AppError> {
    let mut attempts = 0;
    let mut payload = call(client, prompt, &[], temperature, &mut attempts).await?;

    if let Verdict::Invalid { missing } = validation::assess(schema, &payload) {
        warn!("{schema:?} response missing keys {missing:?}; retrying in strict mode");
        payload = call(
            client,
            prompt,
            &[STRICT_JSON_INSTRUCTION],
            temperature,
            &mut attempts,
        )
        .await?;
    }

    match validation::assess(schema, &payload) {
        Verdict::Valid => {}
        Verdict::Declined(envelope) => {
            warn!("Salary estimator declined: {}", envelope.message());
            return Err(AppError::ModelDeclined(envelope.message()));
        }
        Verdict::Invalid { missing } => {
            return Err(AppError::SchemaValidation(format!(
                "Salary estimate is missing required fields: {}",
                missing.join(", ")
            )));
        }
    }

    let report = validation::canonicalize(schema, payload);
    let document = report::format(schema, &report);
    info!("{schema:?} completed after {attempts} calls");

    Ok(SalaryRun {
        attempts,
        markdown: document.to_markdown(),
        document,
        raw: Value::Object(report),
    })
}

async fn call(
    client: &CompletionClient,
    prompt: &BuiltPrompt,
    preamble: &[&str],
    temperature: Option<f32>,
    attempts: &mut u32,
) -> Result<Map<String, Value>, AppError> {
    let request = client.request_for(
        Stage::SalaryEstimator,
        OutputMode::Json,
        prompt.to_messages(preamble),
        temperature,
    )?;
    *attempts += 1;
    Ok(client.complete(&request).await?.into_json())
}
