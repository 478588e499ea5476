use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;

const CONFIG_ENV: &str = "DENTAL_CONTACT_CONFIG";

const VALID_VALUES: &str = r#"{
    "name": "Jane Doe",
    "email": "jane@example.com",
    "phone": "1234567890",
    "message": "I'd like a consult"
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn fast_config(dir: &Path) -> PathBuf {
    write(dir, "config.json", r#"{ "transport_delay_ms": 0 }"#)
}

#[test]
fn validate_command_accepts_valid_values() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let values = write(dir.path(), "values.json", VALID_VALUES);

    let output = Command::cargo_bin("dental-contact")?
        .arg("validate")
        .arg("--values")
        .arg(&values)
        .output()?;
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("Validation result: valid"));
    Ok(())
}

#[test]
fn validate_command_fails_on_bad_email() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let values = write(
        dir.path(),
        "values.json",
        &VALID_VALUES.replace("jane@example.com", "not-an-email"),
    );

    let output = Command::cargo_bin("dental-contact")?
        .arg("validate")
        .arg("--values")
        .arg(&values)
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("email: Please enter a valid email address"));
    Ok(())
}

#[test]
fn validate_command_rejects_non_string_values() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let values = write(dir.path(), "values.json", r#"{ "phone": 1234567890 }"#);

    let output = Command::cargo_bin("dental-contact")?
        .arg("validate")
        .arg("--values")
        .arg(&values)
        .output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("must be a string"));
    Ok(())
}

#[test]
fn schema_command_prints_required_fields() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::cargo_bin("dental-contact")?.arg("schema").output()?;
    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(schema["required"][0], "name");
    assert_eq!(schema["properties"]["message"]["minLength"], 10);
    Ok(())
}

#[test]
fn schema_meta_describes_form_schemas() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::cargo_bin("dental-contact")?
        .args(["schema", "--meta"])
        .output()?;
    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(schema["title"], "FormSchema");
    Ok(())
}

#[test]
fn submit_command_resets_form_on_success() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let values = write(dir.path(), "values.json", VALID_VALUES);
    let config = fast_config(dir.path());

    let output = Command::cargo_bin("dental-contact")?
        .arg("submit")
        .arg("--values")
        .arg(&values)
        .arg("--config")
        .arg(&config)
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Message sent successfully!"));
    let state_start = stdout.find('{').expect("state json");
    let state: Value = serde_json::from_str(&stdout[state_start..])?;
    assert_eq!(state["submission"], "success");
    let name = state["fields"]
        .as_array()
        .and_then(|fields| fields.iter().find(|field| field["name"] == "name"))
        .expect("name field");
    assert_eq!(name["value"], "");
    Ok(())
}

#[test]
fn submit_command_keeps_values_on_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let values = write(dir.path(), "values.json", VALID_VALUES);
    let config = fast_config(dir.path());

    let output = Command::cargo_bin("dental-contact")?
        .arg("submit")
        .arg("--values")
        .arg(&values)
        .arg("--config")
        .arg(&config)
        .arg("--fail")
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Please try again or call us directly."));
    let stdout = String::from_utf8(output.stdout)?;
    let state: Value = serde_json::from_str(&stdout)?;
    assert_eq!(state["submission"], "error");
    let name = state["fields"]
        .as_array()
        .and_then(|fields| fields.iter().find(|field| field["name"] == "name"))
        .expect("name field");
    assert_eq!(name["value"], "Jane Doe");
    Ok(())
}

#[test]
fn submit_command_uses_env_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let values = write(dir.path(), "values.json", VALID_VALUES);
    let config = write(
        dir.path(),
        "config.json",
        r#"{ "transport_delay_ms": 0, "success_message": "See you soon, {{name}}." }"#,
    );

    let output = Command::cargo_bin("dental-contact")?
        .arg("submit")
        .arg("--values")
        .arg(&values)
        .env(CONFIG_ENV, &config)
        .output()?;
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("See you soon, Jane Doe."));
    Ok(())
}

#[test]
fn fill_command_reprompts_until_valid() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let config = fast_config(dir.path());
    // name, email (bad then good), phone, treatment, date, urgency, message
    let answers = [
        "Jane Doe",
        "not-an-email",
        "jane@example.com",
        "1234567890",
        "Invisalign",
        "",
        "",
        "I'd like a consult",
    ];
    let stdin = format!("{}\n", answers.join("\n"));

    let output = Command::cargo_bin("dental-contact")?
        .arg("fill")
        .arg("--config")
        .arg(&config)
        .write_stdin(stdin)
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Form: Book Your Appointment"));
    assert!(stdout.contains("6/7 Urgency Level (low/medium/high) [medium]"));
    assert!(stdout.contains("Sent ✅"));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Invalid answer: Please enter a valid email address"));
    Ok(())
}

#[test]
fn fill_command_stops_when_input_ends() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::cargo_bin("dental-contact")?
        .arg("fill")
        .write_stdin("Jane Doe\n")
        .output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("input ended"));
    Ok(())
}
