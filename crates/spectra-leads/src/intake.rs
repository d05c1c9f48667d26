//! ---
//! spx_section: "07-lead-intake"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Lead validation and hand-off to the configured sink."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use spectra_common::{FieldIssue, ValidationError};
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{LeadError, Result};
use crate::model::{Lead, LeadSubmission};
use crate::sink::{LeadSink, LogLeadSink};

const REQUIRED: &str = "Required";
const CONSENT_MESSAGE: &str = "Invalid literal value, expected true";

/// Field order used when reporting issues, as `(struct field, wire name)`.
const FIELDS: [(&str, &str); 8] = [
    ("first_name", "firstName"),
    ("last_name", "lastName"),
    ("email", "email"),
    ("company", "company"),
    ("job_title", "jobTitle"),
    ("monthly_volume", "monthlyVolume"),
    ("message", "message"),
    ("accept_privacy_policy", "acceptPrivacyPolicy"),
];

fn wire_name(field: &str) -> &str {
    FIELDS
        .iter()
        .find(|(name, wire)| *name == field || *wire == field)
        .map(|(_, wire)| *wire)
        .unwrap_or(field)
}

fn field_rank(path: &str) -> usize {
    FIELDS
        .iter()
        .position(|(_, wire)| *wire == path)
        .unwrap_or(FIELDS.len())
}

fn field_text<'a>(submission: &'a LeadSubmission, path: &str) -> Option<&'a str> {
    match path {
        "firstName" => submission.first_name.as_deref(),
        "lastName" => submission.last_name.as_deref(),
        "email" => submission.email.as_deref(),
        "company" => submission.company.as_deref(),
        "jobTitle" => submission.job_title.as_deref(),
        "message" => submission.message.as_deref(),
        _ => None,
    }
}

fn describe(error: &validator::ValidationError, text: Option<&str>) -> String {
    match error.code.as_ref() {
        "required" => REQUIRED.to_owned(),
        "email" => "Invalid email".to_owned(),
        "range" => "Number must be greater than 0".to_owned(),
        "length" => {
            let len = text.map(|value| value.chars().count() as u64);
            let min = error.params.get("min").and_then(Value::as_u64);
            let max = error.params.get("max").and_then(Value::as_u64);
            match (len, min, max) {
                (Some(len), Some(min), _) if len < min => {
                    format!("String must contain at least {min} character(s)")
                }
                (_, _, Some(max)) => format!("String must contain at most {max} character(s)"),
                _ => "Invalid length".to_owned(),
            }
        }
        other => error
            .message
            .as_ref()
            .map(|message| message.to_string())
            .unwrap_or_else(|| other.to_owned()),
    }
}

/// Check a submission and turn it into a [`Lead`] with a fresh identifier.
/// All offending fields are reported together, in form order.
pub fn validate(submission: LeadSubmission) -> std::result::Result<Lead, ValidationError> {
    let mut issues = Vec::new();
    if let Err(errors) = submission.validate() {
        for (field, field_errors) in errors.field_errors() {
            let field: &str = &field;
            let path = wire_name(field);
            let text = field_text(&submission, path);
            issues.extend(
                field_errors
                    .iter()
                    .map(|error| FieldIssue::new(path, describe(error, text))),
            );
        }
    }
    match submission.accept_privacy_policy {
        Some(true) => {}
        Some(false) => issues.push(FieldIssue::new("acceptPrivacyPolicy", CONSENT_MESSAGE)),
        None => issues.push(FieldIssue::new("acceptPrivacyPolicy", REQUIRED)),
    }
    issues.sort_by_key(|issue| field_rank(&issue.path));
    if let Some(err) = ValidationError::from_issues(issues) {
        return Err(err);
    }

    let LeadSubmission {
        first_name,
        last_name,
        email,
        company,
        job_title,
        monthly_volume,
        message,
        ..
    } = submission;
    match (
        first_name,
        last_name,
        email,
        company,
        job_title,
        monthly_volume,
        message,
    ) {
        (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(company),
            Some(job_title),
            Some(monthly_volume),
            Some(message),
        ) => Ok(Lead {
            lead_id: Uuid::new_v4(),
            received_at: Utc::now(),
            first_name,
            last_name,
            email,
            company,
            job_title,
            monthly_volume,
            message,
        }),
        _ => Err(ValidationError::single("", REQUIRED)),
    }
}

/// Validates submissions and forwards accepted leads to a [`LeadSink`].
#[derive(Debug, Clone)]
pub struct LeadIntake {
    sink: Arc<dyn LeadSink>,
}

impl Default for LeadIntake {
    fn default() -> Self {
        Self::new(Arc::new(LogLeadSink))
    }
}

impl LeadIntake {
    pub fn new(sink: Arc<dyn LeadSink>) -> Self {
        Self { sink }
    }

    pub fn submit(&self, submission: LeadSubmission) -> Result<Lead> {
        let lead = validate(submission)?;
        if let Err(err) = self.sink.record(&lead) {
            warn!(lead_id = %lead.lead_id, error = %err, "lead rejected by sink");
            return Err(LeadError::from(err));
        }
        debug!(lead_id = %lead.lead_id, "lead accepted");
        Ok(lead)
    }
}
