//! ---
//! spx_section: "07-lead-intake"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Enterprise lead validation and hand-off."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
pub mod errors;
pub mod intake;
pub mod model;
pub mod sink;

pub use errors::{LeadError, Result, SinkError};
pub use intake::{validate, LeadIntake};
pub use model::{Lead, LeadSubmission};
pub use sink::{LeadSink, LogLeadSink, MemoryLeadSink};

/// Confirmation shown to the prospect after a successful submission.
pub const CONFIRMATION_MESSAGE: &str = "Merci ! Notre équipe vous recontacte sous 24h ouvrées.";
