//! Prompt Builder: fills the static stage templates with request inputs.
//!
//! Templates mark substitutions as `{name}` where `name` is a lower-case
//! identifier. Any other brace (JSON examples in the prompt text) is copied
//! through untouched. Substitution is a single pass, so a value that happens
//! to contain `{resume_text}` is inserted literally and never re-expanded.

use thiserror::Error;

use crate::analysis::prompts::{ANALYZER_SYSTEM, ANALYZER_USER_TEMPLATE};
use crate::editor::prompts::{EDITOR_SYSTEM, EDITOR_USER_TEMPLATE};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::ChatMessage;
use crate::models::{ResumeVersion, Stage};
use crate::report::NOT_SPECIFIED;
use crate::salary::prompts::{
    ROLE_SALARY_SYSTEM, ROLE_SALARY_USER_TEMPLATE, SALARY_SYSTEM, SALARY_USER_TEMPLATE,
};

/// Resume text beyond this many characters is cut before salary estimation.
pub const SALARY_RESUME_CHAR_LIMIT: usize = 8000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("Template placeholder '{{{0}}}' has no value")]
    MissingPlaceholder(String),
}

/// System + user prompt pair produced for one stage call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub system: String,
    pub user: String,
}

impl BuiltPrompt {
    /// `[system, preamble..., user]` in call order.
    pub fn to_messages(&self, preamble: &[&str]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(preamble.len() + 2);
        messages.push(ChatMessage::system(self.system.clone()));
        messages.extend(preamble.iter().map(|p| ChatMessage::user(*p)));
        messages.push(ChatMessage::user(self.user.clone()));
        messages
    }
}

/// Everything a stage template may reference. The job description must
/// already be normalized by the caller ("" when absent).
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInputs<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    /// Serialized output of an earlier stage (the analyzer JSON for the editor).
    pub prior_output: Option<&'a str>,
    pub resume_version: ResumeVersion,
}

/// Builds the prompt pair for `stage`. Pure: equal inputs give equal output.
pub fn build(stage: Stage, inputs: &PromptInputs<'_>) -> Result<BuiltPrompt, PromptError> {
    match stage {
        Stage::Analyzer => Ok(BuiltPrompt {
            system: json_system(ANALYZER_SYSTEM),
            user: fill_template(
                ANALYZER_USER_TEMPLATE,
                &[
                    ("resume_text", inputs.resume_text),
                    ("job_description", inputs.job_description),
                ],
            )?,
        }),
        Stage::Editor => Ok(BuiltPrompt {
            system: EDITOR_SYSTEM.to_string(),
            user: fill_template(
                EDITOR_USER_TEMPLATE,
                &[
                    ("analyzer_json", inputs.prior_output.unwrap_or("{}")),
                    ("resume_text", inputs.resume_text),
                    ("job_description", inputs.job_description),
                    ("resume_version", inputs.resume_version.as_str()),
                ],
            )?,
        }),
        Stage::SalaryEstimator => Ok(BuiltPrompt {
            system: json_system(SALARY_SYSTEM),
            user: fill_template(
                SALARY_USER_TEMPLATE,
                &[
                    (
                        "resume_text",
                        crate::documents::truncate_chars(
                            inputs.resume_text,
                            SALARY_RESUME_CHAR_LIMIT,
                        ),
                    ),
                    ("job_description", or_dash(inputs.job_description)),
                ],
            )?,
        }),
    }
}

/// Inputs for the estimate of an explicitly named role.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleSalaryInputs<'a> {
    pub role_title: &'a str,
    pub city: &'a str,
    pub seniority: Option<&'a str>,
    pub resume_summary: Option<&'a str>,
    pub job_description: &'a str,
}

pub fn build_role_salary(inputs: &RoleSalaryInputs<'_>) -> Result<BuiltPrompt, PromptError> {
    Ok(BuiltPrompt {
        system: json_system(ROLE_SALARY_SYSTEM),
        user: fill_template(
            ROLE_SALARY_USER_TEMPLATE,
            &[
                ("role_title", inputs.role_title.trim()),
                ("seniority", or_not_specified(inputs.seniority.unwrap_or(""))),
                ("city", or_not_specified(inputs.city)),
                ("resume_summary", or_dash(inputs.resume_summary.unwrap_or(""))),
                ("job_description", or_dash(inputs.job_description)),
            ],
        )?,
    })
}

fn json_system(stage_system: &str) -> String {
    format!("{stage_system}\n\n{JSON_ONLY_SYSTEM}")
}

fn or_not_specified(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_SPECIFIED
    } else {
        value.trim()
    }
}

/// "—" for blank values, so the model sees an explicit absence marker.
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "—"
    } else {
        value
    }
}

/// Replaces every `{name}` in `template` with its value from `vars`.
///
/// Fails on the first placeholder with no entry in `vars`. Entries that the
/// template never references are ignored.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> Result<String, PromptError> {
    let extra: usize = vars.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match placeholder_name(after) {
            Some(name) => {
                let value = vars
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| PromptError::MissingPlaceholder(name.to_string()))?;
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Returns `name` when `text` starts with `name}` and `name` is
/// `[a-z_][a-z0-9_]*`.
fn placeholder_name(text: &str) -> Option<&str> {
    let close = text.find('}')?;
    let name = &text[..close];
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_lowercase() || first == '_') {
        return None;
    }
    chars
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        .then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_substitutes_named_placeholders() {
        let out = fill_template(
            "Resume:\n{resume_text}\nJD: {job_description}",
            &[("resume_text", "Rust dev"), ("job_description", "")],
        )
        .unwrap();
        assert_eq!(out, "Resume:\nRust dev\nJD: ");
    }

    #[test]
    fn test_fill_template_errors_on_missing_value() {
        let err = fill_template("Hello {name}", &[]).unwrap_err();
        assert_eq!(err, PromptError::MissingPlaceholder("name".to_string()));
    }

    #[test]
    fn test_json_braces_pass_through() {
        let template = "Return {\"rating\": \"low|high\"} and {} and {Upper} for {x}";
        let out = fill_template(template, &[("x", "1")]).unwrap();
        assert_eq!(out, "Return {\"rating\": \"low|high\"} and {} and {Upper} for 1");
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let out = fill_template("{a}", &[("a", "{b}"), ("b", "boom")]).unwrap();
        assert_eq!(out, "{b}");
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        let out = fill_template("tail {oops", &[]).unwrap();
        assert_eq!(out, "tail {oops");
    }

    #[test]
    fn test_build_is_deterministic() {
        let inputs = PromptInputs {
            resume_text: "Jane Doe, Rust engineer",
            job_description: "",
            ..Default::default()
        };
        let a = build(Stage::Analyzer, &inputs).unwrap();
        let b = build(Stage::Analyzer, &inputs).unwrap();
        assert_eq!(a, b);
        assert!(a.user.contains("Jane Doe, Rust engineer"));
    }

    #[test]
    fn test_every_stage_template_fills_completely() {
        let inputs = PromptInputs {
            resume_text: "RESUME-MARKER",
            job_description: "JD-MARKER",
            prior_output: Some("{\"top_issues\": []}"),
            resume_version: ResumeVersion::Full,
        };
        for stage in [Stage::Analyzer, Stage::Editor, Stage::SalaryEstimator] {
            let built = build(stage, &inputs).unwrap();
            assert!(!built.system.is_empty());
            assert!(built.user.contains("RESUME-MARKER"), "{stage} lost the resume");
            assert!(built.user.contains("JD-MARKER"), "{stage} lost the JD");
        }
    }

    #[test]
    fn test_editor_defaults_prior_output_to_empty_object() {
        let built = build(
            Stage::Editor,
            &PromptInputs {
                resume_text: "resume",
                ..Default::default()
            },
        )
        .unwrap();
        assert!(built.user.contains("{}"));
        assert!(built.user.contains("concise"));
    }

    #[test]
    fn test_salary_truncates_long_resume_and_marks_missing_jd() {
        let resume = "я".repeat(SALARY_RESUME_CHAR_LIMIT + 500);
        let built = build(
            Stage::SalaryEstimator,
            &PromptInputs {
                resume_text: &resume,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(built.user.matches('я').count(), SALARY_RESUME_CHAR_LIMIT);
        assert!(built.user.contains('—'));
    }

    #[test]
    fn test_role_salary_fills_fallbacks() {
        let built = build_role_salary(&RoleSalaryInputs {
            role_title: "Data Engineer",
            city: " ",
            ..Default::default()
        })
        .unwrap();
        assert!(built.user.contains("ROLE: Data Engineer"));
        assert!(built.user.contains("SENIORITY: not specified"));
        assert!(built.user.contains("CITY / LOCATION: not specified"));
        assert!(built.user.contains("CANDIDATE SUMMARY: —"));
        assert!(built.system.ends_with(JSON_ONLY_SYSTEM));
    }

    #[test]
    fn test_json_stages_demand_json_only() {
        let inputs = PromptInputs {
            resume_text: "resume",
            ..Default::default()
        };
        assert!(build(Stage::Analyzer, &inputs).unwrap().system.contains(JSON_ONLY_SYSTEM));
        assert!(build(Stage::SalaryEstimator, &inputs).unwrap().system.contains(JSON_ONLY_SYSTEM));
        assert!(!build(Stage::Editor, &inputs).unwrap().system.contains(JSON_ONLY_SYSTEM));
    }

    #[test]
    fn test_to_messages_orders_preamble_between_system_and_user() {
        let built = BuiltPrompt {
            system: "sys".to_string(),
            user: "usr".to_string(),
        };
        let messages = built.to_messages(&["note"]);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ChatMessage::system("sys"));
        assert_eq!(messages[1], ChatMessage::user("note"));
        assert_eq!(messages[2], ChatMessage::user("usr"));
    }
}
