//! ---
//! spx_section: "06-security-access-control"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Claim-driven access rules for the admin dashboard."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
//! Access rules for the mall events admin dashboard.
//!
//! Everything here is a pure function of a [`ClaimSet`] and a section table:
//! callers fetch claims from the identity provider and pass them in
//! explicitly on every evaluation.
#![warn(missing_docs)]

pub mod capabilities;
pub mod claims;
pub mod evaluator;
pub mod sections;
pub mod selection;

pub use capabilities::{Capabilities, Capability};
pub use claims::{ClaimSet, SUPER_ADMIN_ROLE};
pub use evaluator::{evaluate, meets_permissions, meets_roles, AccessDecision};
pub use sections::{dashboard_sections, SectionDescriptor, SectionTable, SectionTableError};
pub use selection::select_section;

use serde::Serialize;
use tracing::debug;

/// Everything the presentation layer needs for one render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSnapshot {
    /// Per-section decisions, in descriptor order.
    pub sections: Vec<AccessDecision>,
    /// Summary capability flags.
    pub capabilities: Capabilities,
    /// Section to display, if any is accessible.
    pub selected_section: Option<String>,
}

/// Evaluator bound to a validated section table.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    sections: SectionTable,
}

impl Default for AccessEvaluator {
    fn default() -> Self {
        Self::new(SectionTable::dashboard())
    }
}

impl AccessEvaluator {
    /// Build an evaluator over the provided table.
    pub fn new(sections: SectionTable) -> Self {
        Self { sections }
    }

    /// Section table backing this evaluator.
    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    /// Evaluate sections, capabilities, and selection for one principal.
    pub fn snapshot(&self, claims: &ClaimSet, current: Option<&str>) -> AccessSnapshot {
        let sections = evaluate(claims, self.sections.as_slice());
        let capabilities = Capabilities::for_claims(claims);
        let selected_section = select_section(current, &sections).map(str::to_owned);
        debug!(
            granular = claims.has_granular_rules(),
            super_admin = claims.is_super_admin(),
            accessible = sections.iter().filter(|d| d.accessible).count(),
            selected = selected_section.as_deref().unwrap_or("-"),
            "access snapshot evaluated"
        );
        AccessSnapshot {
            sections,
            capabilities,
            selected_section,
        }
    }
}
