use std::future::Future;
use std::time::Duration;

use contact_spec::ContactRequest;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Delivers a contact request to whoever handles bookings.
pub trait SubmissionTransport {
    fn deliver(
        &self,
        request: &ContactRequest,
    ) -> impl Future<Output = Result<(), TransportError>>;
}

/// Waits, then logs the request instead of sending it anywhere.
#[derive(Debug, Clone)]
pub struct LoggingTransport {
    delay: Duration,
}

impl LoggingTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl SubmissionTransport for LoggingTransport {
    async fn deliver(&self, request: &ContactRequest) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;
        let payload = serde_json::to_string(request)
            .map_err(|err| TransportError::Rejected(format!("json encode: {}", err)))?;
        tracing::info!("form data: {}", payload);
        Ok(())
    }
}

/// Always fails; stands in for an unreachable booking service.
#[derive(Debug, Clone)]
pub struct FailingTransport {
    reason: String,
}

impl FailingTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SubmissionTransport for FailingTransport {
    async fn deliver(&self, request: &ContactRequest) -> Result<(), TransportError> {
        tracing::debug!("dropping submission from {}", request.email);
        Err(TransportError::Unavailable(self.reason.clone()))
    }
}
