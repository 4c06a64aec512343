//! Section renderers shared by both salary estimate reports.

use serde_json::Value;

use super::{display, field, scalar, SectionBody, NOT_SPECIFIED};

pub fn heading(key: &str) -> Option<&'static str> {
    Some(match key {
        "roles" => "Suitable roles",
        "estimate_rub_month" => "Market range (RUB/month)",
        "ranges_per_role" => "Ranges per role",
        "confidence" => "Confidence",
        "notes" => "Notes",
        "sources" => "Sources",
        "assumptions" => "Assumptions",
        _ => return None,
    })
}

pub fn render(key: &str, value: &Value) -> Option<SectionBody> {
    match (key, value) {
        ("roles", Value::Array(items)) => {
            Some(SectionBody::Bullets(items.iter().map(role).collect()))
        }
        ("estimate_rub_month", Value::Object(obj)) => Some(SectionBody::Table(vec![
            ("Min".to_string(), money(obj.get("min"))),
            ("Median".to_string(), money(obj.get("median"))),
            ("Max".to_string(), money(obj.get("max"))),
        ])),
        ("ranges_per_role", Value::Array(items)) => {
            Some(SectionBody::Bullets(items.iter().map(role_range).collect()))
        }
        ("confidence", v) => scalar(v).map(|c| SectionBody::Prose(c.to_lowercase())),
        ("notes", v) => scalar(v).map(SectionBody::Prose),
        _ => None,
    }
}

fn role(item: &Value) -> String {
    let Value::Object(obj) = item else {
        return display(item);
    };
    let mut line = format!(
        "**{}**: {} ({})",
        field(obj, "title"),
        field(obj, "direction"),
        field(obj, "seniority")
    );
    if let Some(reason) = obj.get("fit_reason").and_then(scalar) {
        line.push_str(". ");
        line.push_str(&reason);
    }
    line
}

fn role_range(item: &Value) -> String {
    let Value::Object(obj) = item else {
        return display(item);
    };
    format!(
        "{}: {} to {} (median {})",
        field(obj, "title"),
        money(obj.get("min")),
        money(obj.get("max")),
        money(obj.get("median"))
    )
}

/// Whole roubles grouped by thousands ("180 000"); other values as text.
fn money(value: Option<&Value>) -> String {
    match value {
        Some(v) => match v.as_i64() {
            Some(amount) => group_thousands(amount),
            None => display(v),
        },
        None => NOT_SPECIFIED.to_string(),
    }
}

fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
