//! ---
//! spx_section: "08-pricing-calculators"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "ROI calculation and formatting routines."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoiError>;

/// Errors raised while setting up a calculator. Input problems are reported
/// as [`spectra_common::ValidationError`] instead.
#[derive(Debug, Error, PartialEq)]
pub enum RoiError {
    #[error("subscription cost must be a positive finite number, got {0}")]
    InvalidSubscriptionCost(f64),
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
    #[error("currency code must be three ASCII letters, got '{0}'")]
    InvalidCurrency(String),
}
