//! ---
//! spx_section: "07-lead-intake"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Lead submission schema and captured lead record."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Contact form payload as received. Every field is optional on the wire so
/// that missing values are reported alongside the other field issues.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LeadSubmission {
    #[serde(rename = "firstName", default, deserialize_with = "trimmed")]
    #[validate(required, length(min = 2, max = 50))]
    pub first_name: Option<String>,

    #[serde(rename = "lastName", default, deserialize_with = "trimmed")]
    #[validate(required, length(min = 2, max = 50))]
    pub last_name: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required, email)]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required, length(min = 2, max = 100))]
    pub company: Option<String>,

    #[serde(rename = "jobTitle", default, deserialize_with = "trimmed")]
    #[validate(required, length(min = 2, max = 100))]
    pub job_title: Option<String>,

    #[serde(rename = "monthlyVolume", default)]
    #[validate(required, range(exclusive_min = 0.0))]
    pub monthly_volume: Option<f64>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required, length(min = 20, max = 2000))]
    pub message: Option<String>,

    /// Checked separately: only a literal `true` is accepted.
    #[serde(rename = "acceptPrivacyPolicy", default)]
    pub accept_privacy_policy: Option<bool>,
}

fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|raw| raw.trim().to_owned()))
}

/// Accepted lead. The consent flag is dropped once verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub lead_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub job_title: String,
    pub monthly_volume: f64,
    pub message: String,
}
