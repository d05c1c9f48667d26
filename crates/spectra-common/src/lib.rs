//! ---
//! spx_section: "01-core-functionality"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Shared primitives and utilities for the Spectra services."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
//! Core shared primitives for the Spectra workspace.
//! This crate exposes configuration loading, logging bootstrap, and the
//! field-level validation error shared by the calculators and the API.

pub mod config;
pub mod logging;
pub mod validation;

pub use config::{
    ApiConfig, AppConfig, Environment, LoadedAppConfig, LoggingConfig, MetricsConfig, RoiConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use validation::{decode_json, FieldIssue, ValidationError};
