use std::time::Duration;

use contact_spec::{ContactRequest, SchemaError};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notify::NotificationKind;

pub const DEFAULT_SUCCESS_MESSAGE: &str =
    "Message sent successfully! We'll get back to you within 24 hours.";
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Failed to send message. Please try again or call us directly.";
pub const DEFAULT_TRANSPORT_DELAY_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse controller config: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("form schema is invalid: {0}")]
    Schema(#[from] SchemaError),
    #[error("message template '{name}' is invalid: {source}")]
    Template {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}

/// Controller settings. Every key is optional; an empty document yields the defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ControllerConfig {
    /// Handlebars template rendered with the submitted request.
    #[serde(default)]
    pub success_message: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Delay of the logging transport, in milliseconds.
    #[serde(default)]
    pub transport_delay_ms: Option<u64>,
}

pub fn load_config(config_json: &str) -> Result<ControllerConfig, ConfigError> {
    if config_json.trim().is_empty() {
        return Ok(ControllerConfig::default());
    }
    serde_json::from_str(config_json).map_err(ConfigError::Parse)
}

impl ControllerConfig {
    pub fn transport_delay(&self) -> Duration {
        Duration::from_millis(
            self.transport_delay_ms
                .unwrap_or(DEFAULT_TRANSPORT_DELAY_MS),
        )
    }

    pub fn messages(&self) -> Result<Messages, ConfigError> {
        Messages::new(
            self.success_message.as_deref().unwrap_or(DEFAULT_SUCCESS_MESSAGE),
            self.error_message.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE),
        )
    }
}

/// Notification texts, rendered per submission.
#[derive(Debug, Clone)]
pub struct Messages {
    registry: Handlebars<'static>,
}

impl Messages {
    const SUCCESS: &'static str = "success";
    const ERROR: &'static str = "error";

    pub fn new(success: &str, error: &str) -> Result<Self, ConfigError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        for (name, template) in [(Self::SUCCESS, success), (Self::ERROR, error)] {
            registry
                .register_template_string(name, template)
                .map_err(|source| ConfigError::Template {
                    name,
                    source: Box::new(source),
                })?;
        }
        Ok(Self { registry })
    }

    pub fn render(&self, kind: NotificationKind, request: &ContactRequest) -> String {
        let (name, fallback) = match kind {
            NotificationKind::Success => (Self::SUCCESS, DEFAULT_SUCCESS_MESSAGE),
            NotificationKind::Error => (Self::ERROR, DEFAULT_ERROR_MESSAGE),
        };
        self.registry.render(name, request).unwrap_or_else(|err| {
            tracing::warn!("failed to render {} message: {}", name, err);
            fallback.to_string()
        })
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_MESSAGE, DEFAULT_ERROR_MESSAGE).unwrap_or_else(|err| {
            tracing::warn!("default messages did not register: {}", err);
            // `render` falls back to the fixed texts for missing templates.
            let mut registry = Handlebars::new();
            registry.register_escape_fn(handlebars::no_escape);
            Self { registry }
        })
    }
}
