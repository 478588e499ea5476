pub mod contact;
pub mod field;
pub mod form;

pub use contact::TREATMENTS;
pub use field::{Constraint, FieldKind, FieldOption, FieldSpec};
pub use form::{FormSchema, SchemaError};
