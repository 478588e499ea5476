use std::cell::{Cell, RefCell};
use std::time::Duration;

use contact_form::{
    FailingTransport, FormController, LoggingTransport, NotificationKind, RecordingSink,
    SubmissionTransport, SubmitReport, TransportError, load_config, submit,
};
use contact_spec::{ContactRequest, FormValues, SubmissionStatus};

/// Counts deliveries and yields once so other tasks can run mid-flight.
struct CountingTransport {
    calls: Cell<usize>,
    fail: bool,
    seen: RefCell<Vec<ContactRequest>>,
}

impl CountingTransport {
    fn ok() -> Self {
        Self {
            calls: Cell::new(0),
            fail: false,
            seen: RefCell::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }
}

impl SubmissionTransport for CountingTransport {
    async fn deliver(&self, request: &ContactRequest) -> Result<(), TransportError> {
        self.calls.set(self.calls.get() + 1);
        self.seen.borrow_mut().push(request.clone());
        tokio::task::yield_now().await;
        if self.fail {
            Err(TransportError::Unavailable("booking service down".into()))
        } else {
            Ok(())
        }
    }
}

fn filled_controller() -> RefCell<FormController> {
    let mut controller = FormController::contact();
    for (field, value) in [
        ("name", "Jane Doe"),
        ("email", "jane@example.com"),
        ("phone", "1234567890"),
        ("message", "I'd like a consult"),
    ] {
        controller.set_field(field, value).expect("known field");
    }
    RefCell::new(controller)
}

#[tokio::test]
async fn valid_submission_resets_the_form() {
    let controller = filled_controller();
    let transport = CountingTransport::ok();
    let sink = RecordingSink::new();

    let report = submit(&controller, &transport, &sink).await;

    assert_eq!(report, SubmitReport::Delivered);
    assert_eq!(transport.calls.get(), 1);
    let controller = controller.borrow();
    assert_eq!(controller.status(), SubmissionStatus::Success);
    let expected = FormValues::new()
        .with("name", "")
        .with("email", "")
        .with("phone", "")
        .with("message", "")
        .with("treatment", "")
        .with("preferredDate", "")
        .with("urgency", "medium");
    assert_eq!(controller.values(), &expected);

    let notifications = sink.take();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Success);
    assert!(notifications[0].message.starts_with("Message sent successfully!"));
}

#[tokio::test]
async fn invalid_fields_never_reach_the_transport() {
    let transport = CountingTransport::ok();
    let sink = RecordingSink::new();

    for (field, value) in [
        ("name", ""),
        ("name", "J"),
        ("email", "not-an-email"),
        ("phone", "555-0100"),
        ("message", "Help"),
    ] {
        let controller = filled_controller();
        controller
            .borrow_mut()
            .set_field(field, value)
            .expect("known field");

        let report = submit(&controller, &transport, &sink).await;

        assert!(matches!(report, SubmitReport::Invalid(ref result) if !result.valid));
        let controller = controller.borrow();
        assert_eq!(controller.status(), SubmissionStatus::Idle);
        assert!(controller.errors().contains_key(field), "{} error missing", field);
    }

    assert_eq!(transport.calls.get(), 0);
    assert!(sink.notifications().is_empty());
}

#[tokio::test]
async fn double_submit_delivers_once() {
    let controller = filled_controller();
    let transport = CountingTransport::ok();
    let sink = RecordingSink::new();

    let (first, second) = tokio::join!(
        submit(&controller, &transport, &sink),
        submit(&controller, &transport, &sink),
    );

    assert_eq!(first, SubmitReport::Delivered);
    assert_eq!(second, SubmitReport::AlreadySubmitting);
    assert_eq!(transport.calls.get(), 1);
    assert_eq!(sink.notifications().len(), 1);
}

#[tokio::test]
async fn edits_in_flight_do_not_touch_the_payload() {
    let controller = filled_controller();
    let transport = CountingTransport::failing();
    let sink = RecordingSink::new();

    let edit = async {
        controller
            .borrow_mut()
            .set_field("name", "Janet Doe")
            .expect("name");
        assert_eq!(controller.borrow().status(), SubmissionStatus::Submitting);
    };
    let (report, ()) = tokio::join!(submit(&controller, &transport, &sink), edit);

    assert!(matches!(report, SubmitReport::Failed(_)));
    assert_eq!(transport.seen.borrow()[0].name, "Jane Doe");
    // The failed submission keeps what the user typed last.
    assert_eq!(controller.borrow().values().get("name"), Some("Janet Doe"));
}

#[tokio::test]
async fn transport_failure_preserves_values() {
    let controller = filled_controller();
    let before = controller.borrow().values().clone();
    let sink = RecordingSink::new();

    let report = submit(&controller, &FailingTransport::new("offline"), &sink).await;

    assert_eq!(
        report,
        SubmitReport::Failed(TransportError::Unavailable("offline".into()))
    );
    {
        let controller = controller.borrow();
        assert_eq!(controller.status(), SubmissionStatus::Error);
        assert_eq!(controller.values(), &before);
    }
    let notifications = sink.take();
    assert_eq!(notifications[0].kind, NotificationKind::Error);
    assert_eq!(
        notifications[0].message,
        "Failed to send message. Please try again or call us directly."
    );

    controller
        .borrow_mut()
        .set_field("phone", "0987654321")
        .expect("phone");
    assert_eq!(controller.borrow().status(), SubmissionStatus::Idle);
}

#[tokio::test]
async fn retry_after_failure_can_succeed() {
    let controller = filled_controller();
    let sink = RecordingSink::new();

    submit(&controller, &FailingTransport::new("offline"), &sink).await;
    let report = submit(&controller, &CountingTransport::ok(), &sink).await;

    assert_eq!(report, SubmitReport::Delivered);
    assert_eq!(controller.borrow().status(), SubmissionStatus::Success);
    let kinds: Vec<NotificationKind> = sink.take().into_iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::Error, NotificationKind::Success]);
}

#[tokio::test]
async fn discard_mid_flight_abandons_the_result() {
    let controller = filled_controller();
    let transport = CountingTransport::ok();
    let sink = RecordingSink::new();

    let teardown = async {
        controller.borrow_mut().discard();
    };
    let (report, ()) = tokio::join!(submit(&controller, &transport, &sink), teardown);

    assert_eq!(report, SubmitReport::Abandoned);
    assert!(sink.notifications().is_empty());
    assert_eq!(controller.borrow().values().get("name"), Some("Jane Doe"));
}

#[tokio::test]
async fn configured_messages_and_logging_transport() {
    let config = load_config(
        r#"{ "success_message": "Thank you, {{name}}!", "transport_delay_ms": 1 }"#,
    )
    .expect("config");
    let mut controller = FormController::from_config(&config).expect("controller");
    for (field, value) in [
        ("name", "Jane Doe"),
        ("email", "jane@example.com"),
        ("phone", "1234567890"),
        ("message", "I'd like a consult"),
    ] {
        controller.set_field(field, value).expect("known field");
    }
    let controller = RefCell::new(controller);
    let sink = RecordingSink::new();
    let transport = LoggingTransport::new(config.transport_delay());
    assert_eq!(config.transport_delay(), Duration::from_millis(1));

    let report = submit(&controller, &transport, &sink).await;

    assert_eq!(report, SubmitReport::Delivered);
    assert_eq!(sink.take()[0].message, "Thank you, Jane Doe!");
}

#[test]
fn completion_follows_edits() {
    let mut controller = FormController::contact();
    assert_eq!(controller.completion().percentage(), 0.0);
    controller.set_field("name", "x").expect("name");
    assert_eq!(controller.completion().percentage(), 25.0);
    controller.set_field("urgency", "high").expect("urgency");
    assert_eq!(controller.completion().percentage(), 25.0);
    controller.set_field("name", "").expect("name");
    assert_eq!(controller.completion().percentage(), 0.0);
}
