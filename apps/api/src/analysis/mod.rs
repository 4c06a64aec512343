//! Analyzer stage: resume review against an optional job description.

pub mod fallback;
pub mod handlers;
pub mod prompts;

use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::CompletionClient;
use crate::report::{self, Document};
use crate::session::SessionContext;
use crate::validation::{self, Schema};

pub use fallback::{AnalysisMode, Cascade};

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub mode: AnalysisMode,
    pub attempts: u32,
    pub note: Option<String>,
    pub document: Document,
    pub markdown: String,
    /// Canonicalized report, as stored in the `analysis_json` slot.
    pub raw: Value,
}

/// Runs the analyzer for the session's current inputs. Does not touch the
/// session; the caller stores `raw` on success.
pub async fn run_analysis(
    client: &CompletionClient,
    session: &SessionContext,
    temperature: Option<f32>,
) -> Result<AnalysisRun, AppError> {
    let resume_text = session.resume();
    if resume_text.trim().is_empty() {
        return Err(AppError::Input(
            "A resume is required before running the analysis".to_string(),
        ));
    }

    let outcome = Cascade::new(client, temperature)
        .run(resume_text, &session.job_description)
        .await?;

    let report = validation::canonicalize(Schema::Analysis, outcome.report);
    let document = report::format(Schema::Analysis, &report);

    Ok(AnalysisRun {
        mode: outcome.mode,
        attempts: outcome.attempts,
        note: outcome.note,
        markdown: document.to_markdown(),
        document,
        raw: Value::Object(report),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// Long enough to count as a real job description.
    pub const LONG_JD: &str = "We are hiring a senior backend engineer to design and operate \
        high load services in Rust and Go with Kafka, PostgreSQL and Kubernetes across \
        several product teams";

    pub fn valid_analysis() -> Value {
        json!({
            "overall_assessment": "Strong backend profile",
            "clarity_assessment": {"rating": "high", "why": "Clear", "suggestion": "None"},
            "volume_assessment": {"estimated_words": 450, "estimated_pages": 1},
            "top_issues": [{"severity": "medium", "issue": "No metrics", "why": "x", "fix_suggestion": "y"}],
            "missing_data": [{"field": "links", "status": "missing", "note": "No GitHub"}],
            "keywords_match": {"from_jd": [], "coverage_percent": null},
            "priority_fix_list": ["Add metrics"]
        })
    }
}
