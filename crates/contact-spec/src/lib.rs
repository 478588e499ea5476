#![allow(missing_docs)]

pub mod answers_schema;
pub mod progress;
pub mod render;
pub mod spec;
pub mod status;
pub mod validate;
pub mod values;

pub use answers_schema::generate as answers_schema;
pub use progress::{Progress, completion};
pub use render::{
    RenderField, RenderPayload, RenderProgress, RenderStatus, build_render_payload,
    render_json_ui, render_text,
};
pub use spec::{
    Constraint, FieldKind, FieldOption, FieldSpec, FormSchema, SchemaError, TREATMENTS,
};
pub use status::SubmissionStatus;
pub use validate::{validate, validate_field, validate_json};
pub use values::{
    ContactRequest, FormValues, SchemaViolation, Urgency, ValidationError, ValidationResult,
};
