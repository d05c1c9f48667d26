//! ---
//! spx_section: "07-lead-intake"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Destinations for accepted leads."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::fmt::Debug;

use parking_lot::Mutex;
use tracing::info;

use crate::errors::SinkError;
use crate::model::Lead;

/// Receives every lead that passed validation.
pub trait LeadSink: Send + Sync + Debug {
    fn record(&self, lead: &Lead) -> Result<(), SinkError>;
}

/// Default sink: writes the lead to the structured log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLeadSink;

impl LeadSink for LogLeadSink {
    fn record(&self, lead: &Lead) -> Result<(), SinkError> {
        info!(
            lead_id = %lead.lead_id,
            company = %lead.company,
            job_title = %lead.job_title,
            monthly_volume = lead.monthly_volume,
            "inbound enterprise lead captured"
        );
        Ok(())
    }
}

/// Keeps leads in memory and refuses a second submission for the same email.
#[derive(Debug, Default)]
pub struct MemoryLeadSink {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    emails: HashSet<String>,
    leads: Vec<Lead>,
}

impl MemoryLeadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.inner.lock().leads.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LeadSink for MemoryLeadSink {
    fn record(&self, lead: &Lead) -> Result<(), SinkError> {
        let mut state = self.inner.lock();
        if !state.emails.insert(lead.email.to_lowercase()) {
            return Err(SinkError::Duplicate {
                email: lead.email.clone(),
            });
        }
        state.leads.push(lead.clone());
        Ok(())
    }
}
