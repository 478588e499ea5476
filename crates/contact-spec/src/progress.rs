use serde::Serialize;

use crate::spec::form::FormSchema;
use crate::values::FormValues;

/// Required fields filled so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub filled: usize,
    pub total: usize,
}

impl Progress {
    /// Share of required fields holding a value, 0 to 100.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.filled as f64 * 100.0 / self.total as f64
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.total
    }
}

/// Counts required fields with a non-empty value. Rules are not applied.
pub fn completion(schema: &FormSchema, values: &FormValues) -> Progress {
    let mut progress = Progress {
        filled: 0,
        total: 0,
    };
    for field in schema.required_fields() {
        progress.total += 1;
        if values
            .get(&field.name)
            .is_some_and(|value| !value.is_empty())
        {
            progress.filled += 1;
        }
    }
    progress
}
