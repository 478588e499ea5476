use serde::{Deserialize, Serialize};

/// Lifecycle of a single submission attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Submitting => "submitting",
            SubmissionStatus::Success => "success",
            SubmissionStatus::Error => "error",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }
}
