use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::spec::form::FormSchema;

/// Input that cannot be interpreted as form values at all.
///
/// Distinct from a [`ValidationResult`] with errors: a violation means the
/// payload was malformed, not that the user typed something unacceptable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("form values must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("field '{field}' must be a string, found {found}")]
    NonStringValue { field: String, found: &'static str },
}

/// Raw string input keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every schema field at its initial value.
    pub fn defaults(schema: &FormSchema) -> Self {
        Self(
            schema
                .fields
                .iter()
                .map(|field| (field.name.clone(), field.initial_value()))
                .collect(),
        )
    }

    pub fn from_json(value: &Value) -> Result<Self, SchemaViolation> {
        let object = value
            .as_object()
            .ok_or_else(|| SchemaViolation::NotAnObject(json_type_name(value)))?;
        let mut values = BTreeMap::new();
        for (field, raw) in object {
            let text = raw.as_str().ok_or_else(|| SchemaViolation::NonStringValue {
                field: field.clone(),
                found: json_type_name(raw),
            })?;
            values.insert(field.clone(), text.to_string());
        }
        Ok(Self(values))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(field, value)| (field.clone(), Value::String(value.clone())))
                .collect::<Map<_, _>>(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Outcome of validating a set of values against a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
    #[serde(default)]
    pub missing_required: Vec<String>,
    #[serde(default)]
    pub unknown_fields: Vec<String>,
}

impl ValidationResult {
    pub fn error_for(&self, field: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|error| error.field == field)
    }

    /// Field is present and passed its rules.
    pub fn is_field_valid(&self, field: &str) -> bool {
        self.error_for(field).is_none()
            && !self.missing_required.iter().any(|missing| missing == field)
            && !self.unknown_fields.iter().any(|unknown| unknown == field)
    }
}

/// How soon the patient would like to be seen.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Low, Urgency::Medium, Urgency::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Low => "Low - Within a month",
            Urgency::Medium => "Medium - Within 2 weeks",
            Urgency::High => "High - ASAP",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown urgency level '{0}'")]
pub struct UnknownUrgency(pub String);

impl FromStr for Urgency {
    type Err = UnknownUrgency;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Urgency::ALL
            .into_iter()
            .find(|level| level.as_str() == raw)
            .ok_or_else(|| UnknownUrgency(raw.to_string()))
    }
}

/// Record handed to the submission transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}

impl ContactRequest {
    /// Copies the current values into an owned request. Empty optionals become `None`.
    pub fn from_values(values: &FormValues) -> Self {
        let text = |field: &str| values.get(field).unwrap_or_default().to_string();
        let optional = |field: &str| {
            values
                .get(field)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        ContactRequest {
            name: text("name"),
            email: text("email"),
            phone: text("phone"),
            message: text("message"),
            treatment: optional("treatment"),
            preferred_date: optional("preferredDate"),
            urgency: optional("urgency").and_then(|raw| raw.parse().ok()),
        }
    }
}
