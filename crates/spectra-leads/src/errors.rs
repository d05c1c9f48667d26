//! ---
//! spx_section: "07-lead-intake"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Error types for lead intake."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use spectra_common::ValidationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeadError>;

/// Failure reported by a [`crate::LeadSink`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("lead already submitted for {email}")]
    Duplicate { email: String },
    #[error("lead sink unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum LeadError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("lead already submitted for {email}")]
    Duplicate { email: String },
    #[error("lead could not be recorded: {0}")]
    Sink(String),
}

impl From<SinkError> for LeadError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Duplicate { email } => LeadError::Duplicate { email },
            SinkError::Unavailable(reason) => LeadError::Sink(reason),
        }
    }
}
