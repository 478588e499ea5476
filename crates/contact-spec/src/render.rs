use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::{
    progress::completion,
    spec::{
        field::{FieldKind, FieldOption},
        form::FormSchema,
    },
    status::SubmissionStatus,
    validate::validate,
    values::FormValues,
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Required fields are still empty.
    NeedInput,
    /// Errors are on display for at least one field.
    Invalid,
    /// Every rule passes; the form can be sent.
    Ready,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Invalid => "invalid",
            RenderStatus::Ready => "ready",
        }
    }
}

/// Progress counters exposed to renderers.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub filled: usize,
    pub total: usize,
    pub percentage: f64,
}

/// Describes a single field for render outputs.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
    pub value: String,
    pub error: Option<String>,
    pub options: Vec<FieldOption>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub form_version: String,
    pub status: RenderStatus,
    pub submission: SubmissionStatus,
    pub progress: RenderProgress,
    pub help: Option<String>,
    pub fields: Vec<RenderField>,
}

/// Build the renderer payload from the schema and one form session.
///
/// `errors` holds only the messages currently on display.
pub fn build_render_payload(
    schema: &FormSchema,
    values: &FormValues,
    errors: &BTreeMap<String, String>,
    submission: SubmissionStatus,
) -> RenderPayload {
    let progress = completion(schema, values);

    let fields = schema
        .fields
        .iter()
        .map(|field| RenderField {
            name: field.name.clone(),
            label: field.label.clone(),
            kind: field.kind,
            required: field.required,
            placeholder: field.placeholder.clone(),
            value: values.get(&field.name).unwrap_or_default().to_string(),
            error: errors.get(&field.name).cloned(),
            options: field.options.clone(),
        })
        .collect::<Vec<_>>();

    let status = if !errors.is_empty() {
        RenderStatus::Invalid
    } else if validate(schema, values).valid {
        RenderStatus::Ready
    } else {
        RenderStatus::NeedInput
    };

    RenderPayload {
        form_id: schema.id.clone(),
        form_title: schema.title.clone(),
        form_version: schema.version.clone(),
        status,
        submission,
        progress: RenderProgress {
            filled: progress.filled,
            total: progress.total,
            percentage: progress.percentage(),
        },
        help: schema.description.clone(),
        fields,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let fields = payload
        .fields
        .iter()
        .map(|field| {
            let mut map = Map::new();
            map.insert("name".into(), Value::String(field.name.clone()));
            map.insert("label".into(), Value::String(field.label.clone()));
            map.insert("type".into(), Value::String(field.kind.as_str().to_string()));
            map.insert("required".into(), Value::Bool(field.required));
            if let Some(placeholder) = &field.placeholder {
                map.insert("placeholder".into(), Value::String(placeholder.clone()));
            }
            map.insert("value".into(), Value::String(field.value.clone()));
            map.insert(
                "error".into(),
                field.error.clone().map(Value::String).unwrap_or(Value::Null),
            );
            if !field.options.is_empty() {
                map.insert(
                    "options".into(),
                    Value::Array(
                        field
                            .options
                            .iter()
                            .map(|option| json!({ "value": option.value, "label": option.label }))
                            .collect(),
                    ),
                );
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "form_version": payload.form_version,
        "status": payload.status.as_str(),
        "submission": payload.submission.as_str(),
        "progress": {
            "filled": payload.progress.filled,
            "total": payload.progress.total,
            "percentage": payload.progress.percentage,
        },
        "help": payload.help,
        "fields": fields,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Status: {} ({}/{}, {:.0}%)",
        payload.status.as_str(),
        payload.progress.filled,
        payload.progress.total,
        payload.progress.percentage
    ));
    if payload.submission != SubmissionStatus::Idle {
        lines.push(format!("Submission: {}", payload.submission.as_str()));
    }
    if let Some(help) = &payload.help {
        lines.push(format!("Help: {}", help));
    }

    lines.push("Fields:".to_string());
    for field in &payload.fields {
        let mut entry = format!(" - {} ({})", field.name, field.label);
        if field.required {
            entry.push_str(" [required]");
        }
        if !field.value.is_empty() {
            entry.push_str(&format!(" = {}", field.value));
        }
        lines.push(entry);
        if let Some(error) = &field.error {
            lines.push(format!("   ! {}", error));
        }
    }

    lines.join("\n")
}
