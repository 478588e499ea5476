pub mod config;
pub mod controller;
pub mod navigation;
pub mod notify;
pub mod transport;

pub use config::{ConfigError, ControllerConfig, Messages, load_config};
pub use controller::{
    ControllerError, FormController, FormState, SubmitAttempt, SubmitReport, Submission,
    SubmissionId, submit,
};
pub use navigation::{NavigationAction, Navigator, ScrollCommand, Section, scroll_top};
pub use notify::{Notification, NotificationKind, NotificationSink, RecordingSink, TracingSink};
pub use transport::{FailingTransport, LoggingTransport, SubmissionTransport, TransportError};
