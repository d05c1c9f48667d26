//! ---
//! spx_section: "01-core-functionality"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Shared primitives and utilities for the Spectra services."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Single offending field reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Dotted path of the field (`""` for the payload itself).
    pub path: String,
    /// Human readable explanation.
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Malformed or out-of-range input. Always carries at least one issue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request payload ({})", render_issues(.issues))]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Build an error from collected issues; `None` when nothing was reported.
    pub fn from_issues(issues: Vec<FieldIssue>) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Self { issues })
        }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(path, message)],
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<FieldIssue> {
        self.issues
    }

    /// Whether any issue points at `path`.
    pub fn mentions(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decode a JSON value into `T`, reporting the offending path on failure.
pub fn decode_json<T: DeserializeOwned>(value: Value) -> Result<T, ValidationError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let path = if path == "." { String::new() } else { path };
        ValidationError::single(path, err.into_inner().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[allow(dead_code)]
        amount: f64,
    }

    #[test]
    fn empty_issue_list_is_not_an_error() {
        assert!(ValidationError::from_issues(Vec::new()).is_none());
    }

    #[test]
    fn decode_reports_field_path() {
        let err = decode_json::<Probe>(json!({ "amount": "lots" })).unwrap_err();
        assert!(err.mentions("amount"));
    }

    #[test]
    fn decode_reports_root_for_wrong_shape() {
        let err = decode_json::<Probe>(json!([1, 2])).unwrap_err();
        assert_eq!(err.issues()[0].path, "");
    }

    #[test]
    fn display_lists_every_issue() {
        let err = ValidationError::from_issues(vec![
            FieldIssue::new("volume", "Required"),
            FieldIssue::new("spread", "Required"),
        ])
        .unwrap();
        let rendered = err.to_string();
        assert!(rendered.contains("volume: Required"));
        assert!(rendered.contains("spread: Required"));
    }
}
