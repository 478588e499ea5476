use serde_json::{Map, Value, json};

use crate::spec::field::{FieldKind, FieldSpec};
use crate::spec::form::FormSchema;

/// JSON Schema describing a valid submission for `schema`.
pub fn generate(schema: &FormSchema) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in &schema.fields {
        properties.insert(field.name.clone(), field_schema(field));
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": schema.title,
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn field_schema(field: &FieldSpec) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), Value::String("string".into()));
    map.insert("title".into(), Value::String(field.label.clone()));
    match field.kind {
        FieldKind::Email => {
            map.insert("format".into(), Value::String("email".into()));
        }
        FieldKind::Date => {
            map.insert("format".into(), Value::String("date".into()));
        }
        _ => {}
    }
    if let Some(default) = &field.default_value {
        map.insert("default".into(), Value::String(default.clone()));
    }

    if let Some(constraint) = &field.constraint {
        if let Some(min_len) = constraint.min_len {
            map.insert("minLength".into(), Value::from(min_len));
        }
        if let Some(max_len) = constraint.max_len {
            map.insert("maxLength".into(), Value::from(max_len));
        }
        if let Some(pattern) = &constraint.pattern {
            map.insert("pattern".into(), Value::String(pattern.clone()));
        }
        if let Some(allowed) = &constraint.one_of {
            map.insert(
                "enum".into(),
                Value::Array(allowed.iter().cloned().map(Value::String).collect()),
            );
        }
    }

    Value::Object(map)
}
