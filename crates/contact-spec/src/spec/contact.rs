use crate::spec::field::{Constraint, FieldKind, FieldOption, FieldSpec};
use crate::spec::form::FormSchema;
use crate::values::Urgency;

/// Treatments offered in the contact form's select box.
pub const TREATMENTS: [&str; 7] = [
    "Teeth Whitening",
    "Invisalign",
    "Cosmetic Dentistry",
    "Dental Implants",
    "Preventive Care",
    "Emergency Care",
    "Other",
];

/// Email shape accepted by the form. Case-insensitive; at least one dot in the
/// domain. Every dot in the local part sits between two other characters.
pub const EMAIL_PATTERN: &str =
    r"(?i)^([a-z0-9_'+\-]+\.)*[a-z0-9_'+\-]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$";

impl FormSchema {
    /// The clinic's contact form.
    pub fn contact() -> Self {
        let treatment_options = TREATMENTS
            .iter()
            .map(|treatment| FieldOption::new(*treatment, *treatment))
            .collect();
        let urgency_options = Urgency::ALL
            .iter()
            .map(|level| FieldOption::new(level.as_str(), level.label()))
            .collect();

        FormSchema {
            id: "contact".into(),
            title: "Book Your Appointment".into(),
            version: "1.0.0".into(),
            description: Some(
                "Fill out the form below and we'll get back to you within 24 hours with a personalized treatment plan."
                    .into(),
            ),
            fields: vec![
                FieldSpec::new("name", FieldKind::Text, "Full Name")
                    .required()
                    .placeholder("Enter your full name")
                    .constraint(min_len(2, "Name must be at least 2 characters")),
                FieldSpec::new("email", FieldKind::Email, "Email Address")
                    .required()
                    .placeholder("Enter your email address")
                    .constraint(Constraint {
                        pattern: Some(EMAIL_PATTERN.into()),
                        message: Some("Please enter a valid email address".into()),
                        ..Constraint::default()
                    }),
                FieldSpec::new("phone", FieldKind::Phone, "Phone Number")
                    .required()
                    .placeholder("Enter your phone number")
                    .constraint(min_len(10, "Please enter a valid phone number")),
                FieldSpec::new("treatment", FieldKind::Select, "Treatment Interest")
                    .placeholder("Select a treatment")
                    .options(treatment_options),
                FieldSpec::new("preferredDate", FieldKind::Date, "Preferred Date"),
                FieldSpec::new("urgency", FieldKind::Select, "Urgency Level")
                    .default_value(Urgency::default().as_str())
                    .options(urgency_options)
                    .constraint(Constraint {
                        one_of: Some(
                            Urgency::ALL
                                .iter()
                                .map(|level| level.as_str().to_string())
                                .collect(),
                        ),
                        message: Some("Urgency must be one of low, medium or high".into()),
                        ..Constraint::default()
                    }),
                FieldSpec::new("message", FieldKind::MultilineText, "Message")
                    .required()
                    .placeholder("Tell us about your dental concerns or questions...")
                    .constraint(min_len(10, "Message must be at least 10 characters")),
            ],
        }
    }
}

fn min_len(min: usize, message: &str) -> Constraint {
    Constraint {
        min_len: Some(min),
        message: Some(message.into()),
        ..Constraint::default()
    }
}
