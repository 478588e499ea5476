use regex::Regex;
use serde_json::Value;

use crate::spec::field::{Constraint, FieldSpec};
use crate::spec::form::FormSchema;
use crate::values::{FormValues, SchemaViolation, ValidationError, ValidationResult};

pub fn validate(schema: &FormSchema, values: &FormValues) -> ValidationResult {
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for field in &schema.fields {
        match values.get(&field.name) {
            None => {
                if field.required {
                    missing_required.push(field.name.clone());
                }
            }
            Some(value) => {
                if let Some(error) = check_value(field, value) {
                    errors.push(error);
                }
            }
        }
    }

    let unknown_fields: Vec<String> = values
        .iter()
        .filter(|(name, _)| schema.field(name).is_none())
        .map(|(name, _)| name.to_string())
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

/// Runs the rules of a single field.
pub fn validate_field(schema: &FormSchema, name: &str, value: &str) -> Option<ValidationError> {
    match schema.field(name) {
        Some(field) => check_value(field, value),
        None => Some(ValidationError {
            field: name.to_string(),
            message: format!("'{}' is not a field of this form", name),
            code: "unknown_field".into(),
        }),
    }
}

/// Validates untyped input, rejecting payloads that are not a map of strings.
pub fn validate_json(
    schema: &FormSchema,
    values: &Value,
) -> Result<ValidationResult, SchemaViolation> {
    let values = FormValues::from_json(values)?;
    Ok(validate(schema, &values))
}

fn check_value(field: &FieldSpec, value: &str) -> Option<ValidationError> {
    // An untouched optional field has nothing to check.
    if !field.required && value.is_empty() {
        return None;
    }

    let constraint = field.constraint.as_ref()?;
    let length = value.chars().count();

    if let Some(pattern) = &constraint.pattern
        && let Ok(regex) = Regex::new(pattern)
        && !regex.is_match(value)
    {
        return Some(base_error(
            field,
            constraint,
            "value does not match pattern",
            "pattern_mismatch",
        ));
    }

    if let Some(min_len) = constraint.min_len
        && length < min_len
    {
        return Some(base_error(
            field,
            constraint,
            &format!("must be at least {} characters", min_len),
            "min_length",
        ));
    }

    if let Some(max_len) = constraint.max_len
        && length > max_len
    {
        return Some(base_error(
            field,
            constraint,
            &format!("must be at most {} characters", max_len),
            "max_length",
        ));
    }

    if let Some(allowed) = &constraint.one_of
        && !allowed.iter().any(|option| option == value)
    {
        return Some(base_error(
            field,
            constraint,
            &format!("must be one of {}", allowed.join(", ")),
            "enum_mismatch",
        ));
    }

    None
}

fn base_error(
    field: &FieldSpec,
    constraint: &Constraint,
    fallback: &str,
    code: &str,
) -> ValidationError {
    ValidationError {
        field: field.name.clone(),
        message: constraint
            .message
            .clone()
            .unwrap_or_else(|| format!("{} {}", field.label, fallback)),
        code: code.into(),
    }
}
