//! Section renderers for the resume analysis report.

use serde_json::{Map, Value};

use super::{display, field, scalar, SectionBody, NOT_SPECIFIED};

pub fn heading(key: &str) -> Option<&'static str> {
    Some(match key {
        "overall_assessment" => "Overall assessment",
        "clarity_assessment" => "Clarity",
        "volume_assessment" => "Volume",
        "top_issues" => "Top issues",
        "completeness_check" => "Missing data",
        "keywords_match" => "Keyword match",
        "candidate_questions" => "Questions for the candidate",
        "priority_fix_list" => "Action plan",
        _ => return None,
    })
}

/// `None` when the value does not have the expected shape; the caller then
/// falls back to the generic rendering.
pub fn render(key: &str, value: &Value) -> Option<SectionBody> {
    match (key, value) {
        ("overall_assessment", v) => scalar(v).map(SectionBody::Prose),
        ("clarity_assessment", Value::Object(obj)) => Some(clarity(obj)),
        ("volume_assessment", Value::Object(obj)) => Some(volume(obj)),
        ("top_issues", Value::Array(items)) => Some(SectionBody::Bullets(
            items.iter().map(issue).collect(),
        )),
        ("completeness_check", Value::Array(items)) => Some(SectionBody::Bullets(
            items.iter().map(completeness_item).collect(),
        )),
        ("keywords_match", Value::Object(obj)) => Some(keywords(obj)),
        ("candidate_questions" | "priority_fix_list", Value::Array(items)) => Some(
            SectionBody::Bullets(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("{}. {}", i + 1, display(item)))
                    .collect(),
            ),
        ),
        _ => None,
    }
}

fn clarity(obj: &Map<String, Value>) -> SectionBody {
    let rating = obj
        .get("rating")
        .and_then(scalar)
        .map(|r| r.to_uppercase())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    SectionBody::Table(vec![
        ("Rating".to_string(), rating),
        ("Why".to_string(), field(obj, "why")),
        ("Suggestion".to_string(), field(obj, "suggestion")),
    ])
}

fn volume(obj: &Map<String, Value>) -> SectionBody {
    SectionBody::Table(
        [
            ("Words", "estimated_words"),
            ("Pages", "estimated_pages"),
            ("Relative to average", "relative_to_average"),
            ("Relative to golden standard", "relative_to_golden_standard"),
            ("Why", "why"),
            ("Suggestion", "suggestion"),
        ]
        .into_iter()
        .map(|(label, key)| (label.to_string(), field(obj, key)))
        .collect(),
    )
}

fn severity_badge(severity: Option<&str>) -> &'static str {
    match severity.map(str::to_lowercase).as_deref() {
        Some("high") => "**CRITICAL**",
        Some("low") => "**MINOR**",
        _ => "**IMPORTANT**",
    }
}

fn issue(item: &Value) -> String {
    let Value::Object(obj) = item else {
        return display(item);
    };
    let badge = severity_badge(obj.get("severity").and_then(Value::as_str));
    let issue = obj
        .get("issue")
        .and_then(scalar)
        .unwrap_or_else(|| "Unknown issue".to_string());
    format!(
        "{badge} {issue}. Why it matters: {}. Fix: {}",
        field(obj, "why"),
        field(obj, "fix_suggestion")
    )
}

fn completeness_label(name: &str) -> Option<&'static str> {
    Some(match name {
        "contacts" => "Contacts",
        "role" => "Target role",
        "seniority" => "Seniority",
        "dates" => "Employment dates",
        "companies" => "Companies",
        "responsibilities" => "Responsibilities",
        "achievements_metrics" => "Achievements and metrics",
        "stack_tools" => "Stack and tools",
        "education" => "Education",
        "languages" => "Languages",
        "location" => "Location",
        "links" => "Links",
        _ => return None,
    })
}

fn status_icon(status: Option<&str>) -> &'static str {
    match status {
        Some("present") => "✅",
        Some("partial") => "⚠️",
        Some("missing") | None => "❌",
        Some(_) => "❓",
    }
}

fn completeness_item(item: &Value) -> String {
    let Value::Object(obj) = item else {
        return display(item);
    };
    let name = obj
        .get("field")
        .and_then(scalar)
        .unwrap_or_else(|| "Unknown field".to_string());
    let label = completeness_label(&name)
        .map(str::to_string)
        .unwrap_or(name);
    let icon = status_icon(obj.get("status").and_then(Value::as_str));
    format!("**{label}:** {icon} {}", field(obj, "note"))
}

fn coverage_icon(percent: f64) -> &'static str {
    if percent >= 80.0 {
        "🟢"
    } else if percent >= 60.0 {
        "🟡"
    } else {
        "🔴"
    }
}

fn keywords(obj: &Map<String, Value>) -> SectionBody {
    let coverage = match obj.get("coverage_percent") {
        Some(v) => match v.as_f64() {
            Some(percent) => format!("{} {}%", coverage_icon(percent), display(v)),
            None => display(v),
        },
        None => NOT_SPECIFIED.to_string(),
    };
    SectionBody::Table(vec![
        ("From job description".to_string(), field(obj, "from_jd")),
        ("Found exactly".to_string(), field(obj, "found_exact")),
        ("Found approximately".to_string(), field(obj, "found_fuzzy")),
        ("Missing".to_string(), field(obj, "missing")),
        ("Coverage".to_string(), coverage),
    ])
}
