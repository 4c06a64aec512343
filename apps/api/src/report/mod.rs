//! Report Formatter: turns a validated JSON report into a titled document.
//!
//! Section order comes from the schema registry in `validation`, so the keys
//! the validator requires are exactly the keys rendered first. Keys the
//! registry does not know are appended in payload order with a heading
//! derived from the key. Formatting is total: any JSON value renders, and
//! every required key yields at least one line.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::Schema;

pub mod analysis;
pub mod salary;

/// Placeholder for absent or empty values.
pub const NOT_SPECIFIED: &str = "not specified";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum SectionBody {
    Prose(String),
    Bullets(Vec<String>),
    /// Label / value rows.
    Table(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Payload key the section was rendered from.
    pub key: String,
    pub heading: String,
    pub body: SectionBody,
}

impl Section {
    fn new(key: &str, heading: impl Into<String>, body: SectionBody) -> Self {
        // An empty list or table still has to produce a visible line.
        let body = match body {
            SectionBody::Bullets(items) if items.is_empty() => {
                SectionBody::Prose(NOT_SPECIFIED.to_string())
            }
            SectionBody::Table(rows) if rows.is_empty() => {
                SectionBody::Prose(NOT_SPECIFIED.to_string())
            }
            SectionBody::Prose(text) if text.trim().is_empty() => {
                SectionBody::Prose(NOT_SPECIFIED.to_string())
            }
            other => other,
        };
        Self {
            key: key.to_string(),
            heading: heading.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Document {
    #[cfg(test)]
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n", section.heading));
            match &section.body {
                SectionBody::Prose(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
                SectionBody::Bullets(items) => {
                    for item in items {
                        out.push_str(&format!("- {item}\n"));
                    }
                }
                SectionBody::Table(rows) => {
                    out.push_str("| Field | Value |\n|---|---|\n");
                    for (label, value) in rows {
                        out.push_str(&format!("| {} | {} |\n", cell(label), cell(value)));
                    }
                }
            }
        }
        out
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Renders `payload` as a document for `schema`.
pub fn format(schema: Schema, payload: &Map<String, Value>) -> Document {
    let spec = schema.spec();
    let mut sections = Vec::with_capacity(payload.len().max(spec.fields.len()));

    for field in spec.fields {
        let value = std::iter::once(field.name)
            .chain(field.aliases.iter().copied())
            .find_map(|key| payload.get(key));

        match value {
            Some(value) => sections.push(render_known(schema, field.name, value)),
            None if field.required => sections.push(Section::new(
                field.name,
                heading_for(schema, field.name),
                SectionBody::Prose(NOT_SPECIFIED.to_string()),
            )),
            None => {}
        }
    }

    for (key, value) in payload {
        if key == "error" || schema.field(key).is_some() {
            continue;
        }
        sections.push(Section::new(key, title_case(key), generic_body(value)));
    }

    Document {
        title: spec.title.to_string(),
        sections,
    }
}

fn render_known(schema: Schema, key: &str, value: &Value) -> Section {
    let specialized = match schema {
        Schema::Analysis => analysis::render(key, value),
        Schema::SalaryEstimate | Schema::RoleSalaryEstimate => salary::render(key, value),
    };
    let body = specialized.unwrap_or_else(|| generic_body(value));
    Section::new(key, heading_for(schema, key), body)
}

fn heading_for(schema: Schema, key: &str) -> String {
    let label = match schema {
        Schema::Analysis => analysis::heading(key),
        Schema::SalaryEstimate | Schema::RoleSalaryEstimate => salary::heading(key),
    };
    label.map(str::to_string).unwrap_or_else(|| title_case(key))
}

/// Scalars as prose, arrays as bullets, objects as a table.
pub fn generic_body(value: &Value) -> SectionBody {
    match value {
        Value::Array(items) => SectionBody::Bullets(items.iter().map(display).collect()),
        Value::Object(map) => SectionBody::Table(
            map.iter()
                .map(|(k, v)| (title_case(k), display(v)))
                .collect(),
        ),
        other => SectionBody::Prose(display(other)),
    }
}

/// "custom_score" -> "Custom Score".
pub fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text for a scalar; `None` for null, blank strings and containers.
pub(crate) fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "yes" } else { "no" }.to_string()),
        _ => None,
    }
}

/// Any value as one line of text.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::Array(items) if items.is_empty() => NOT_SPECIFIED.to_string(),
        Value::Array(items) if items.iter().all(|v| scalar(v).is_some()) => items
            .iter()
            .filter_map(scalar)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        other => scalar(other).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
    }
}

/// `obj[key]` as text, or the placeholder.
pub(crate) fn field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .map(display)
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_every_required_key_contributes_a_line() {
        let doc = format(Schema::Analysis, &Map::new());
        let required: Vec<_> = Schema::Analysis.required_keys().collect();
        for key in &required {
            let section = doc.section(key).expect("required key rendered");
            assert_eq!(section.body, SectionBody::Prose(NOT_SPECIFIED.to_string()));
        }
        // Optional and absent: skipped.
        assert!(doc.section("candidate_questions").is_none());
        assert_eq!(doc.sections.len(), required.len());
    }

    #[test]
    fn test_unknown_key_gets_generated_section() {
        let doc = format(
            Schema::Analysis,
            &map(json!({"overall_assessment": "Solid", "custom_score": 42})),
        );
        let section = doc.section("custom_score").unwrap();
        assert_eq!(section.heading, "Custom Score");
        assert_eq!(section.body, SectionBody::Prose("42".to_string()));
        // Unknown keys come after every known one.
        assert_eq!(doc.sections.last().unwrap().key, "custom_score");
        assert!(doc.to_markdown().contains("## Custom Score\n\n42\n"));
    }

    #[test]
    fn test_generic_body_shapes() {
        assert_eq!(
            generic_body(&json!(["a", "b"])),
            SectionBody::Bullets(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            generic_body(&json!({"max_pay": 10})),
            SectionBody::Table(vec![("Max Pay".to_string(), "10".to_string())])
        );
        assert_eq!(
            generic_body(&Value::Null),
            SectionBody::Prose(NOT_SPECIFIED.to_string())
        );
    }

    #[test]
    fn test_empty_list_renders_placeholder() {
        let doc = format(Schema::Analysis, &map(json!({"extra_notes": []})));
        assert_eq!(
            doc.section("extra_notes").unwrap().body,
            SectionBody::Prose(NOT_SPECIFIED.to_string())
        );
    }

    #[test]
    fn test_error_key_is_not_rendered() {
        let doc = format(Schema::RoleSalaryEstimate, &map(json!({"error": true})));
        assert!(doc.section("error").is_none());
    }

    #[test]
    fn test_markdown_table_escapes_pipes() {
        let doc = Document {
            title: "T".to_string(),
            sections: vec![Section::new(
                "k",
                "K",
                SectionBody::Table(vec![("a|b".to_string(), "line\nbreak".to_string())]),
            )],
        };
        assert!(doc.to_markdown().contains("| a\\|b | line break |"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("custom_score"), "Custom Score");
        assert_eq!(title_case("x"), "X");
        assert_eq!(title_case("__"), "");
    }
}
