//! Response Validator and the schema registry.
//!
//! The registry is the one place that says which top-level keys each JSON
//! report carries. The validator uses it to accept or reject payloads and the
//! report formatter uses it to decide section order, so "what is accepted"
//! and "what is rendered" cannot drift apart.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod envelope;

pub use envelope::ErrorEnvelope;

/// A JSON report shape produced by one of the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    Analysis,
    SalaryEstimate,
    /// Estimate for an explicitly named role and city.
    RoleSalaryEstimate,
}

/// One known top-level key.
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Older names accepted in place of `name`.
    pub aliases: &'static [&'static str],
    pub required: bool,
}

const fn required(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        aliases: &[],
        required: true,
    }
}

const fn optional(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        aliases: &[],
        required: false,
    }
}

#[derive(Debug)]
pub struct SchemaSpec {
    pub title: &'static str,
    /// Render order.
    pub fields: &'static [FieldSpec],
}

static ANALYSIS: SchemaSpec = SchemaSpec {
    title: "Resume analysis",
    fields: &[
        required("overall_assessment"),
        required("clarity_assessment"),
        required("volume_assessment"),
        required("top_issues"),
        FieldSpec {
            name: "completeness_check",
            aliases: &["missing_data"],
            required: true,
        },
        required("keywords_match"),
        optional("candidate_questions"),
        required("priority_fix_list"),
    ],
};

static SALARY_ESTIMATE: SchemaSpec = SchemaSpec {
    title: "Salary estimate (RUB/month)",
    fields: &[
        required("roles"),
        required("estimate_rub_month"),
        required("ranges_per_role"),
        required("confidence"),
        required("notes"),
        optional("sources"),
        required("assumptions"),
    ],
};

static ROLE_SALARY_ESTIMATE: SchemaSpec = SchemaSpec {
    title: "Role salary estimate (RUB/month)",
    fields: &[
        required("estimate_rub_month"),
        required("confidence"),
        required("notes"),
        optional("sources"),
        required("assumptions"),
    ],
};

impl Schema {
    pub fn spec(self) -> &'static SchemaSpec {
        match self {
            Schema::Analysis => &ANALYSIS,
            Schema::SalaryEstimate => &SALARY_ESTIMATE,
            Schema::RoleSalaryEstimate => &ROLE_SALARY_ESTIMATE,
        }
    }

    #[cfg(test)]
    pub fn required_keys(self) -> impl Iterator<Item = &'static str> {
        self.spec()
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
    }

    /// Whether `key` (canonical or alias) is in the registry.
    pub fn field(self, key: &str) -> Option<&'static FieldSpec> {
        self.spec()
            .fields
            .iter()
            .find(|f| f.name == key || f.aliases.contains(&key))
    }
}

fn has_field(map: &Map<String, Value>, field: &FieldSpec) -> bool {
    map.contains_key(field.name) || field.aliases.iter().any(|a| map.contains_key(*a))
}

/// True when `payload` is an object carrying every required key of `schema`.
/// Value types are not checked; the formatter accepts any shape.
#[cfg(test)]
pub fn is_valid(schema: Schema, payload: &Value) -> bool {
    payload
        .as_object()
        .map(|map| missing_fields(schema, map).is_empty())
        .unwrap_or(false)
}

/// Required keys of `schema` absent from `map`.
pub fn missing_fields(schema: Schema, map: &Map<String, Value>) -> Vec<&'static str> {
    schema
        .spec()
        .fields
        .iter()
        .filter(|f| f.required && !has_field(map, f))
        .map(|f| f.name)
        .collect()
}

/// Moves values stored under legacy aliases to their canonical key.
/// A canonical key that is already present wins over its aliases.
pub fn canonicalize(schema: Schema, mut map: Map<String, Value>) -> Map<String, Value> {
    for field in schema.spec().fields {
        for alias in field.aliases {
            if let Some(value) = map.remove(*alias) {
                if !map.contains_key(field.name) {
                    map.insert(field.name.to_string(), value);
                }
            }
        }
    }
    map
}

/// How a stage response should be treated downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Valid,
    /// The model answered with an error envelope instead of a report.
    Declined(ErrorEnvelope),
    /// Parsed, but required keys are missing.
    Invalid { missing: Vec<&'static str> },
}

/// Checks for an error envelope first, then for required keys. A payload that
/// has both an `error` key and a full key set is still a decline.
pub fn assess(schema: Schema, map: &Map<String, Value>) -> Verdict {
    if let Some(envelope) = ErrorEnvelope::detect(map) {
        return Verdict::Declined(envelope);
    }
    let missing = missing_fields(schema, map);
    if missing.is_empty() {
        Verdict::Valid
    } else {
        Verdict::Invalid { missing }
    }
}
