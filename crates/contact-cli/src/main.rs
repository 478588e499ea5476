mod prompt;

use clap::{Parser, Subcommand};
use contact_form::{
    ControllerConfig, FailingTransport, FormController, LoggingTransport, Notification,
    NotificationSink, RecordingSink, SubmissionTransport, SubmitReport, TracingSink, load_config,
    submit,
};
use contact_spec::{
    FormSchema, FormValues, ValidationResult, answers_schema, render_json_ui, render_text,
    validate_json,
};
use prompt::{FormPresenter, PromptContext, Verbosity};
use serde_json::Value;
use std::cell::RefCell;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const CONFIG_ENV: &str = "DENTAL_CONTACT_CONFIG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Clinic contact form helper",
    long_about = "Validates, submits and interactively fills the clinic's contact form"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the JSON Schema a submission must satisfy.
    Schema {
        /// Form schema JSON to describe instead of the built-in contact form.
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
        /// Print the schema of form schema documents instead.
        #[arg(long)]
        meta: bool,
    },
    /// Validate a values file against the form.
    Validate {
        /// JSON object mapping field names to strings.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
        /// Form schema JSON (defaults to the built-in contact form).
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
    },
    /// Fill the form from a values file and submit it.
    Submit {
        /// JSON object mapping field names to strings.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
        /// Controller config JSON (defaults to DENTAL_CONTACT_CONFIG when set).
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Use a transport that always fails.
        #[arg(long)]
        fail: bool,
    },
    /// Fill the form interactively and submit it.
    Fill {
        /// Controller config JSON (defaults to DENTAL_CONTACT_CONFIG when set).
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Show progress after each answer and the final form state.
        #[arg(long)]
        verbose: bool,
        /// Use a transport that always fails.
        #[arg(long)]
        fail: bool,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Schema { spec, meta } => run_schema(spec, meta),
        Command::Validate { values, spec } => run_validate(values, spec),
        Command::Submit {
            values,
            config,
            fail,
        } => run_submit(values, config, fail),
        Command::Fill {
            config,
            verbose,
            fail,
        } => run_fill(config, verbose, fail),
    }
}

fn load_schema(spec_path: Option<PathBuf>) -> CliResult<FormSchema> {
    let schema = match spec_path {
        Some(path) => {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str::<FormSchema>(&contents)?
        }
        None => FormSchema::contact(),
    };
    schema.check()?;
    Ok(schema)
}

fn resolve_config(config_path: Option<PathBuf>) -> CliResult<ControllerConfig> {
    let path = config_path.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    let contents = match path {
        Some(path) => {
            tracing::debug!("loading controller config from {}", path.display());
            fs::read_to_string(&path)
                .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?
        }
        None => String::new(),
    };
    Ok(load_config(&contents)?)
}

fn read_values(path: &PathBuf) -> CliResult<Value> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn run_schema(spec_path: Option<PathBuf>, meta: bool) -> CliResult<()> {
    let output = if meta {
        serde_json::to_value(schemars::schema_for!(FormSchema))?
    } else {
        answers_schema(&load_schema(spec_path)?)
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_validate(values_path: PathBuf, spec_path: Option<PathBuf>) -> CliResult<()> {
    let schema = load_schema(spec_path)?;
    let values = read_values(&values_path)?;

    let result = validate_json(&schema, &values)?;
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    if result.valid {
        Ok(())
    } else {
        print_validation_errors(&result);
        Err("values do not satisfy the form".into())
    }
}

fn run_submit(values_path: PathBuf, config_path: Option<PathBuf>, fail: bool) -> CliResult<()> {
    let config = resolve_config(config_path)?;
    let mut controller = FormController::from_config(&config)?;
    let values = FormValues::from_json(&read_values(&values_path)?)?;
    for (field, value) in values.iter() {
        controller.set_field(field, value)?;
    }

    let controller = RefCell::new(controller);
    let sink = RecordingSink::new();
    let report = if fail {
        drive(&controller, &FailingTransport::new("simulated outage"), &sink)?
    } else {
        drive(&controller, &LoggingTransport::new(config.transport_delay()), &sink)?
    };

    let presenter = FormPresenter::new(Verbosity::Clean);
    for notification in sink.take() {
        presenter.show_notification(&notification);
    }
    let payload = controller.borrow().render_payload();
    println!(
        "{}",
        serde_json::to_string_pretty(&render_json_ui(&payload))?
    );
    report_result(report)
}

fn run_fill(config_path: Option<PathBuf>, verbose: bool, fail: bool) -> CliResult<()> {
    let config = resolve_config(config_path)?;
    let mut controller = FormController::from_config(&config)?;
    let mut presenter = FormPresenter::new(Verbosity::from_verbose(verbose));
    presenter.show_header(&controller.render_payload());

    let fields = controller.render_payload().fields;
    let total = fields.len();
    for (position, field) in fields.iter().enumerate() {
        let prompt = PromptContext::new(field, position + 1, total);
        loop {
            presenter.show_prompt(&prompt);
            let raw = prompt_line()?;
            let answer = if raw.is_empty() {
                field.value.clone()
            } else {
                raw
            };
            controller.set_field(&field.name, answer)?;
            match controller.errors().get(&field.name) {
                Some(message) => presenter.show_field_error(message),
                None => break,
            }
        }
        presenter.show_progress(&controller.render_payload());
    }

    let controller = RefCell::new(controller);
    let sink = TracingSink;
    let recorder = RecordingSink::new();
    let fan_out = FanOut(&sink, &recorder);
    let report = if fail {
        drive(&controller, &FailingTransport::new("simulated outage"), &fan_out)?
    } else {
        drive(&controller, &LoggingTransport::new(config.transport_delay()), &fan_out)?
    };

    for notification in recorder.take() {
        presenter.show_notification(&notification);
    }
    if presenter.verbosity().is_verbose() {
        let payload = controller.borrow().render_payload();
        println!("{}", render_text(&payload));
    }
    report_result(report)
}

/// Forwards each notification to two sinks.
struct FanOut<'a, A, B>(&'a A, &'a B);

impl<A: NotificationSink, B: NotificationSink> NotificationSink for FanOut<'_, A, B> {
    fn notify(&self, notification: Notification) {
        self.0.notify(notification.clone());
        self.1.notify(notification);
    }
}

fn drive<T, N>(
    controller: &RefCell<FormController>,
    transport: &T,
    sink: &N,
) -> CliResult<SubmitReport>
where
    T: SubmissionTransport,
    N: NotificationSink,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    Ok(runtime.block_on(submit(controller, transport, sink)))
}

fn report_result(report: SubmitReport) -> CliResult<()> {
    match report {
        SubmitReport::Delivered => Ok(()),
        SubmitReport::Failed(err) => Err(err.into()),
        SubmitReport::Invalid(result) => {
            print_validation_errors(&result);
            Err("values do not satisfy the form".into())
        }
        SubmitReport::AlreadySubmitting | SubmitReport::Abandoned => {
            Err("submission did not complete".into())
        }
    }
}

fn print_validation_errors(result: &ValidationResult) {
    if !result.errors.is_empty() {
        eprintln!("Validation errors:");
        for error in &result.errors {
            eprintln!("  {}: {}", error.field, error.message);
        }
    }

    if !result.missing_required.is_empty() {
        eprintln!(
            "Missing required answers for: {}",
            result.missing_required.join(", ")
        );
    }

    if !result.unknown_fields.is_empty() {
        eprintln!("Unknown answer fields: {}", result.unknown_fields.join(", "));
    }
}

fn prompt_line() -> CliResult<String> {
    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err("input ended before the form was complete".into());
    }
    Ok(line.trim().to_string())
}
