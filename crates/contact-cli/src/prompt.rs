use contact_form::{Notification, NotificationKind};
use contact_spec::{FieldKind, RenderField, RenderPayload};

/// Controls which bits of state the form shell prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: field prompts only.
    Clean,
    /// Verbose output: progress after each answer and the final form state.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and outcomes while the form is being filled.
pub struct FormPresenter {
    verbosity: Verbosity,
    header_printed: bool,
}

impl FormPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            header_printed: false,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn show_header(&mut self, payload: &RenderPayload) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", payload.form_title);
        if let Some(help) = &payload.help {
            println!("{}", help);
        }
        self.header_printed = true;
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.index, prompt.total, prompt.label);
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if let Some(placeholder) = &prompt.placeholder {
            println!("{}", placeholder);
        }
    }

    pub fn show_field_error(&self, message: &str) {
        eprintln!("Invalid answer: {}", message);
    }

    pub fn show_progress(&self, payload: &RenderPayload) {
        if self.verbosity.is_verbose() {
            println!(
                "Progress: {:.0}% ({}/{} required fields)",
                payload.progress.percentage, payload.progress.filled, payload.progress.total
            );
        }
    }

    pub fn show_notification(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Success => println!("Sent ✅ {}", notification.message),
            NotificationKind::Error => eprintln!("Not sent ❌ {}", notification.message),
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub required: bool,
    pub hint: Option<String>,
    pub placeholder: Option<String>,
}

impl PromptContext {
    pub fn new(field: &RenderField, index: usize, total: usize) -> Self {
        Self {
            index,
            total,
            label: field.label.clone(),
            required: field.required,
            hint: kind_hint(field),
            placeholder: field.placeholder.clone(),
        }
    }
}

fn kind_hint(field: &RenderField) -> Option<String> {
    let mut hint = match field.kind {
        FieldKind::Select if !field.options.is_empty() => {
            let values = field
                .options
                .iter()
                .map(|option| option.value.as_str())
                .collect::<Vec<_>>();
            format!("({})", values.join("/"))
        }
        FieldKind::Date => "(YYYY-MM-DD)".to_string(),
        FieldKind::Email => "(name@example.com)".to_string(),
        _ => return default_hint(field),
    };
    if let Some(default) = default_hint(field) {
        hint.push(' ');
        hint.push_str(&default);
    }
    Some(hint)
}

fn default_hint(field: &RenderField) -> Option<String> {
    (!field.value.is_empty()).then(|| format!("[{}]", field.value))
}
