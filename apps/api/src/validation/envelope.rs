//! Model-reported error envelopes and their classification.
//!
//! The remote model has no stable vocabulary for declining. A structured
//! `code` is trusted when it is one we know; otherwise the free-text reason is
//! matched against keyword lists. The keyword path is a best-effort heuristic
//! and is logged as such.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Codes that identify a missing job description.
const JD_MISSING_CODES: &[&str] = &[
    "jd_missing",
    "job_description_missing",
    "missing_job_description",
    "no_job_description",
    "jd_empty",
];

/// Codes that identify a job description too short to use.
const JD_TOO_SHORT_CODES: &[&str] = &[
    "jd_too_short",
    "job_description_too_short",
    "short_job_description",
];

/// Terms naming the job description, English and Russian.
const JD_TERMS: &[&str] = &[
    "job description",
    "vacancy",
    "jd",
    "описание вакансии",
    "ваканси",
];

/// Terms signalling shortness.
const SHORT_TERMS: &[&str] = &["short", "корот"];

/// Terms signalling absence.
const ABSENT_TERMS: &[&str] = &["missing", "absent", "empty", "нет", "пуст", "отсутств"];

/// Why the model declined to produce a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineReason {
    JobDescriptionMissing,
    JobDescriptionTooShort,
    Other,
}

impl DeclineReason {
    pub fn is_job_description_related(self) -> bool {
        matches!(
            self,
            DeclineReason::JobDescriptionMissing | DeclineReason::JobDescriptionTooShort
        )
    }
}

/// Reason plus how much to trust it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub reason: DeclineReason,
    /// False when derived from keyword matching over free text.
    pub authoritative: bool,
}

/// `{"error": ..., "reason"?: ..., "details"?: ..., "code"?: ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub code: Option<String>,
    pub reason: Option<String>,
    pub details: Option<String>,
}

impl ErrorEnvelope {
    /// Recognizes an envelope by the presence of an `error` key, whatever its
    /// value. A string-valued `error` doubles as the code.
    pub fn detect(map: &Map<String, Value>) -> Option<Self> {
        let error = map.get("error")?;

        let code = map
            .get("code")
            .and_then(text_of)
            .or_else(|| match error {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                _ => None,
            });

        Some(Self {
            code,
            reason: map.get("reason").and_then(text_of),
            details: map
                .get("details")
                .or_else(|| map.get("message"))
                .and_then(text_of),
        })
    }

    /// Best human-readable explanation available.
    pub fn message(&self) -> String {
        self.reason
            .as_deref()
            .or(self.details.as_deref())
            .or(self.code.as_deref())
            .unwrap_or("Unknown error")
            .to_string()
    }

    /// An unrecognized code is treated as free text, since a string-valued
    /// `error` is often a sentence rather than a code.
    pub fn classify(&self) -> Classification {
        if let Some(code) = &self.code {
            let code = code.trim().to_lowercase();
            if JD_MISSING_CODES.contains(&code.as_str()) {
                return authoritative(DeclineReason::JobDescriptionMissing);
            }
            if JD_TOO_SHORT_CODES.contains(&code.as_str()) {
                return authoritative(DeclineReason::JobDescriptionTooShort);
            }
            debug!("Unrecognized decline code '{code}', falling back to reason text");
        }

        let text = [
            self.code.as_deref(),
            self.reason.as_deref(),
            self.details.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

        let reason = classify_text(&text);
        if reason.is_job_description_related() {
            warn!("Decline classified as {reason:?} by keyword heuristic: {text:?}");
        }
        Classification {
            reason,
            authoritative: false,
        }
    }
}

fn authoritative(reason: DeclineReason) -> Classification {
    Classification {
        reason,
        authoritative: true,
    }
}

/// Keyword heuristic over lower-cased reason text.
fn classify_text(text: &str) -> DeclineReason {
    let mentions_jd = JD_TERMS.iter().any(|t| text.contains(t));
    if !mentions_jd {
        return DeclineReason::Other;
    }
    if SHORT_TERMS.iter().any(|t| text.contains(t)) {
        DeclineReason::JobDescriptionTooShort
    } else if ABSENT_TERMS.iter().any(|t| text.contains(t)) {
        DeclineReason::JobDescriptionMissing
    } else {
        DeclineReason::Other
    }
}

/// Strings as-is; other non-null scalars via their JSON text.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn envelope(value: Value) -> ErrorEnvelope {
        ErrorEnvelope::detect(value.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_detect_requires_error_key() {
        let map = json!({"reason": "job description missing"});
        assert!(ErrorEnvelope::detect(map.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_detect_with_boolean_error() {
        let env = envelope(json!({"error": true, "reason": "job description missing"}));
        assert_eq!(env.reason.as_deref(), Some("job description missing"));
        assert!(env.code.is_none());
        assert_eq!(env.message(), "job description missing");
    }

    #[test]
    fn test_english_reason_is_jd_related() {
        let env = envelope(json!({"error": true, "reason": "Job description missing"}));
        let c = env.classify();
        assert_eq!(c.reason, DeclineReason::JobDescriptionMissing);
        assert!(!c.authoritative);
    }

    #[test]
    fn test_russian_reason_is_jd_related() {
        let env = envelope(json!({"error": true, "reason": "Описание вакансии слишком короткое"}));
        assert_eq!(env.classify().reason, DeclineReason::JobDescriptionTooShort);

        let env = envelope(json!({"error": true, "reason": "Нет описания вакансии"}));
        assert_eq!(env.classify().reason, DeclineReason::JobDescriptionMissing);
    }

    #[test]
    fn test_structured_code_is_authoritative() {
        let env = envelope(json!({"error": "JD_MISSING", "reason": "cannot proceed"}));
        let c = env.classify();
        assert_eq!(c.reason, DeclineReason::JobDescriptionMissing);
        assert!(c.authoritative);

        let env = envelope(json!({"error": true, "code": "jd_too_short"}));
        assert_eq!(env.classify().reason, DeclineReason::JobDescriptionTooShort);
    }

    #[test]
    fn test_sentence_in_error_field_is_classified_by_keywords() {
        let env = envelope(json!({"error": "Job description is missing"}));
        let c = env.classify();
        assert_eq!(c.reason, DeclineReason::JobDescriptionMissing);
        assert!(!c.authoritative);

        let env = envelope(json!({"error": "quota exceeded"}));
        assert_eq!(env.classify().reason, DeclineReason::Other);
    }

    #[test]
    fn test_unrelated_reason_is_other() {
        let env = envelope(json!({"error": true, "reason": "resume text is unreadable"}));
        assert_eq!(env.classify().reason, DeclineReason::Other);
        assert!(!env.classify().reason.is_job_description_related());
    }

    #[test]
    fn test_jd_mentioned_without_absence_is_other() {
        let env = envelope(json!({"error": true, "reason": "job description is in a foreign language"}));
        assert_eq!(env.classify().reason, DeclineReason::Other);
    }

    #[test]
    fn test_message_falls_back_to_details_then_code() {
        let env = envelope(json!({"error": true, "details": "editor refused"}));
        assert_eq!(env.message(), "editor refused");

        let env = envelope(json!({"error": "quota"}));
        assert_eq!(env.message(), "quota");

        let env = envelope(json!({"error": true}));
        assert_eq!(env.message(), "Unknown error");
    }
}
