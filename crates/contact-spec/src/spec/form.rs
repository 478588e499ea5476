use std::collections::BTreeSet;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::field::FieldSpec;

/// Reasons a schema definition is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("required field '{0}' has no constraint")]
    RequiredWithoutConstraint(String),
    #[error("field '{field}' has an invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },
    #[error("field '{field}' defaults to '{value}', which is not an allowed value")]
    DefaultNotAllowed { field: String, value: String },
}

/// Declarative definition of a form and its field rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSchema {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.required)
    }

    /// Checks the structural invariants of the schema itself.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            if field.required && !field.has_rules() {
                return Err(SchemaError::RequiredWithoutConstraint(field.name.clone()));
            }
            let Some(constraint) = &field.constraint else {
                continue;
            };
            if let Some(pattern) = &constraint.pattern
                && let Err(err) = Regex::new(pattern)
            {
                return Err(SchemaError::InvalidPattern {
                    field: field.name.clone(),
                    reason: err.to_string(),
                });
            }
            if let (Some(allowed), Some(default)) = (&constraint.one_of, &field.default_value)
                && !allowed.contains(default)
            {
                return Err(SchemaError::DefaultNotAllowed {
                    field: field.name.clone(),
                    value: default.clone(),
                });
            }
        }
        Ok(())
    }
}
