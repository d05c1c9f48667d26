//! ---
//! spx_section: "08-pricing-calculators"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "ROI calculation and formatting routines."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use spectra_common::{FieldIssue, ValidationError};

/// Business ceiling on the optimisation factor; higher values need manual approval.
pub const OPTIMIZATION_CEILING: f64 = 0.1;

pub const CEILING_MESSAGE: &str = "Optimization cannot exceed 10% without manual approval";

const REQUIRED: &str = "Required";
const POSITIVE: &str = "Number must be greater than 0";
const FINITE: &str = "Number must be finite";

/// Validated calculator input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiInput {
    /// Monthly traded volume.
    pub volume: f64,
    /// Current spread.
    pub spread: f64,
    /// Fraction of the spread recovered, in `(0, 0.1]`.
    pub optimization: f64,
}

impl RoiInput {
    pub fn new(volume: f64, spread: f64, optimization: f64) -> Self {
        Self {
            volume,
            spread,
            optimization,
        }
    }

    /// Report every out-of-range field at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_positive(&mut issues, "volume", self.volume);
        check_positive(&mut issues, "spread", self.spread);
        check_positive(&mut issues, "optimization", self.optimization);
        if self.optimization.is_finite() && self.optimization > OPTIMIZATION_CEILING {
            issues.push(FieldIssue::new("optimization", CEILING_MESSAGE));
        }
        match ValidationError::from_issues(issues) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn check_positive(issues: &mut Vec<FieldIssue>, path: &str, value: f64) {
    if !value.is_finite() {
        issues.push(FieldIssue::new(path, FINITE));
    } else if value <= 0.0 {
        issues.push(FieldIssue::new(path, POSITIVE));
    }
}

/// Wire form of the request; every field is optional so that absent values
/// are reported per field rather than as a decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoiRequest {
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub spread: Option<f64>,
    #[serde(default)]
    pub optimization: Option<f64>,
}

impl RoiRequest {
    pub fn into_input(self) -> Result<RoiInput, ValidationError> {
        match (self.volume, self.spread, self.optimization) {
            (Some(volume), Some(spread), Some(optimization)) => {
                let input = RoiInput::new(volume, spread, optimization);
                input.validate()?;
                Ok(input)
            }
            (volume, spread, optimization) => {
                let mut issues = Vec::new();
                for (path, value) in [
                    ("volume", volume),
                    ("spread", spread),
                    ("optimization", optimization),
                ] {
                    match value {
                        None => issues.push(FieldIssue::new(path, REQUIRED)),
                        Some(value) => check_positive(&mut issues, path, value),
                    }
                }
                if optimization.is_some_and(|value| value > OPTIMIZATION_CEILING) {
                    issues.push(FieldIssue::new("optimization", CEILING_MESSAGE));
                }
                Err(ValidationError::from_issues(issues)
                    .unwrap_or_else(|| ValidationError::single("", REQUIRED)))
            }
        }
    }
}

/// Display strings for a [`RoiResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedRoi {
    pub monthly_saving: String,
    pub annual_saving: String,
    pub roi_multiple: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResult {
    pub monthly_saving: f64,
    pub annual_saving: f64,
    pub roi_multiple: f64,
    pub formatted: FormattedRoi,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_is_inclusive() {
        assert!(RoiInput::new(1.0, 1.0, 0.1).validate().is_ok());
        let err = RoiInput::new(1.0, 1.0, 0.11).validate().unwrap_err();
        assert_eq!(err.issues(), [FieldIssue::new("optimization", CEILING_MESSAGE)]);
    }

    #[test]
    fn reports_every_bad_field() {
        let err = RoiInput::new(0.0, -2.0, 2.0).validate().unwrap_err();
        let paths: Vec<_> = err.issues().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["volume", "spread", "optimization"]);
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = RoiInput::new(f64::INFINITY, 1.0, f64::NAN)
            .validate()
            .unwrap_err();
        assert!(err.issues().iter().all(|i| i.message == FINITE));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn missing_fields_are_required() {
        let request: RoiRequest = serde_json::from_str(r#"{"spread": 2.5}"#).unwrap();
        let err = request.into_input().unwrap_err();
        assert_eq!(
            err.issues(),
            [
                FieldIssue::new("volume", REQUIRED),
                FieldIssue::new("optimization", REQUIRED)
            ]
        );
    }
}
