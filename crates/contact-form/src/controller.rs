use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use contact_spec::{
    ContactRequest, FormSchema, FormValues, Progress, RenderPayload, SubmissionStatus,
    ValidationResult, build_render_payload, completion, validate, validate_field,
};
use thiserror::Error;

use crate::config::{ConfigError, ControllerConfig, Messages};
use crate::notify::{Notification, NotificationKind, NotificationSink};
use crate::transport::{SubmissionTransport, TransportError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("'{0}' is not a field of this form")]
    UnknownField(String),
}

/// Identifies one call to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A started submission and the payload frozen at the moment it began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: SubmissionId,
    pub request: ContactRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAttempt {
    /// Hand `request` to the transport, then call [`FormController::finish`].
    Started(Submission),
    /// A submission is already outstanding; nothing was started.
    InFlight,
    /// At least one rule failed; errors are now visible on the form.
    ValidationFailed(ValidationResult),
}

/// Everything the form shows for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: FormValues,
    /// Messages on display, keyed by field. Untouched fields never appear here.
    pub errors: BTreeMap<String, String>,
    pub status: SubmissionStatus,
}

/// Owns one form session and its submission lifecycle.
#[derive(Debug, Clone)]
pub struct FormController {
    schema: FormSchema,
    state: FormState,
    messages: Messages,
    next_id: u64,
    in_flight: Option<Submission>,
}

impl FormController {
    pub fn new(schema: FormSchema) -> Self {
        let state = FormState {
            values: FormValues::defaults(&schema),
            ..FormState::default()
        };
        Self {
            schema,
            state,
            messages: Messages::default(),
            next_id: 1,
            in_flight: None,
        }
    }

    pub fn contact() -> Self {
        Self::new(FormSchema::contact())
    }

    pub fn from_config(config: &ControllerConfig) -> Result<Self, ConfigError> {
        let schema = FormSchema::contact();
        schema.check()?;
        Ok(Self::new(schema).with_messages(config.messages()?))
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.state.errors
    }

    pub fn status(&self) -> SubmissionStatus {
        self.state.status
    }

    pub fn completion(&self) -> Progress {
        completion(&self.schema, &self.state.values)
    }

    pub fn render_payload(&self) -> RenderPayload {
        build_render_payload(
            &self.schema,
            &self.state.values,
            &self.state.errors,
            self.state.status,
        )
    }

    /// Records a keystroke and re-checks that field alone.
    ///
    /// A resolved submission (`success` or `error`) goes back to `idle`. An
    /// outstanding one is left alone; its payload was copied when it started.
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        if self.schema.field(name).is_none() {
            return Err(ControllerError::UnknownField(name.to_string()));
        }
        let value = value.into();
        match validate_field(&self.schema, name, &value) {
            Some(error) => {
                self.state.errors.insert(name.to_string(), error.message);
            }
            None => {
                self.state.errors.remove(name);
            }
        }
        self.state.values.set(name, value);

        if matches!(
            self.state.status,
            SubmissionStatus::Success | SubmissionStatus::Error
        ) {
            self.state.status = SubmissionStatus::Idle;
        }
        tracing::debug!(
            "field {} updated, {:.0}% complete",
            name,
            self.completion().percentage()
        );
        Ok(())
    }

    pub fn begin_submit(&mut self) -> SubmitAttempt {
        if let Some(outstanding) = &self.in_flight {
            tracing::debug!("submission {} still in flight; ignoring submit", outstanding.id);
            return SubmitAttempt::InFlight;
        }

        let result = validate(&self.schema, &self.state.values);
        if !result.valid {
            self.state.errors = result
                .errors
                .iter()
                .map(|error| (error.field.clone(), error.message.clone()))
                .collect();
            for field in &result.missing_required {
                self.state
                    .errors
                    .entry(field.clone())
                    .or_insert_with(|| "This field is required".to_string());
            }
            self.state.status = SubmissionStatus::Idle;
            tracing::debug!("submit blocked by {} invalid field(s)", self.state.errors.len());
            return SubmitAttempt::ValidationFailed(result);
        }

        let submission = Submission {
            id: SubmissionId(self.next_id),
            request: ContactRequest::from_values(&self.state.values),
        };
        self.next_id += 1;
        self.state.errors.clear();
        self.state.status = SubmissionStatus::Submitting;
        self.in_flight = Some(submission.clone());
        tracing::info!("submission {} started", submission.id);
        SubmitAttempt::Started(submission)
    }

    /// Applies the transport's answer. Answers for anything but the
    /// outstanding submission are dropped and yield no notification.
    pub fn finish(
        &mut self,
        id: SubmissionId,
        outcome: Result<(), TransportError>,
    ) -> Option<Notification> {
        let submission = match self.in_flight.take() {
            Some(submission) if submission.id == id => submission,
            other => {
                self.in_flight = other;
                tracing::warn!("ignoring result of stale submission {}", id);
                return None;
            }
        };

        let kind = match outcome {
            Ok(()) => {
                tracing::info!("submission {} delivered", id);
                self.state.status = SubmissionStatus::Success;
                self.state.values = FormValues::defaults(&self.schema);
                self.state.errors.clear();
                NotificationKind::Success
            }
            Err(err) => {
                tracing::warn!("submission {} failed: {}", id, err);
                self.state.status = SubmissionStatus::Error;
                NotificationKind::Error
            }
        };

        Some(Notification {
            kind,
            message: self.messages.render(kind, &submission.request),
        })
    }

    /// Timer hook: a resolved submission returns to `idle`.
    pub fn acknowledge(&mut self) {
        if matches!(
            self.state.status,
            SubmissionStatus::Success | SubmissionStatus::Error
        ) {
            self.state.status = SubmissionStatus::Idle;
        }
    }

    /// Teardown: forget the outstanding submission so its late answer is ignored.
    pub fn discard(&mut self) {
        if let Some(submission) = self.in_flight.take() {
            tracing::info!("submission {} abandoned", submission.id);
        }
        if self.state.status.is_submitting() {
            self.state.status = SubmissionStatus::Idle;
        }
    }
}

/// What became of one call to [`submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReport {
    Delivered,
    Failed(TransportError),
    Invalid(ValidationResult),
    AlreadySubmitting,
    /// The form was discarded before the transport answered.
    Abandoned,
}

/// Runs one submission end to end.
///
/// The controller is only borrowed around the transport call, never across
/// it, so edits and further submit attempts can interleave while it is
/// outstanding. Transport failures are reported, never propagated.
pub async fn submit<T, N>(
    controller: &RefCell<FormController>,
    transport: &T,
    sink: &N,
) -> SubmitReport
where
    T: SubmissionTransport,
    N: NotificationSink,
{
    let attempt = controller.borrow_mut().begin_submit();
    let submission = match attempt {
        SubmitAttempt::Started(submission) => submission,
        SubmitAttempt::InFlight => return SubmitReport::AlreadySubmitting,
        SubmitAttempt::ValidationFailed(result) => return SubmitReport::Invalid(result),
    };

    let outcome = transport.deliver(&submission.request).await;
    let report = match &outcome {
        Ok(()) => SubmitReport::Delivered,
        Err(err) => SubmitReport::Failed(err.clone()),
    };

    let notification = controller.borrow_mut().finish(submission.id, outcome);
    match notification {
        Some(notification) => {
            sink.notify(notification);
            report
        }
        None => SubmitReport::Abandoned,
    }
}
