//! ---
//! spx_section: "06-security-access-control"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Claim-driven access rules for the admin dashboard."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// One navigable area of the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDescriptor {
    /// Unique identifier, also used as the selection key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Optional subtitle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional icon glyph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Any one of these roles grants the section.
    pub required_roles: Vec<String>,
    /// All of these permissions are needed.
    pub required_permissions: Vec<String>,
}

impl SectionDescriptor {
    /// Start a descriptor without requirements.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: None,
            icon: None,
            required_roles: Vec::new(),
            required_permissions: Vec::new(),
        }
    }

    /// Attach a subtitle.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Replace the required roles.
    pub fn requiring_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the required permissions.
    pub fn requiring_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

/// Default sections of the mall events dashboard, in display order.
pub fn dashboard_sections() -> Vec<SectionDescriptor> {
    vec![
        SectionDescriptor::new("overview", "Vue d'ensemble")
            .with_description("Indicateurs temps réel & santé des opérations")
            .with_icon("📊")
            .requiring_permissions(["events:read"]),
        SectionDescriptor::new("events", "Événements & campagnes")
            .with_description("Programmation locale et promotions géolocalisées")
            .with_icon("🗓️")
            .requiring_permissions(["events:read"]),
        SectionDescriptor::new("team", "Équipe & rôles")
            .with_description("Gestion des droits malls & managers")
            .with_icon("👥")
            .requiring_roles(["superadmin"])
            .requiring_permissions(["team:read"]),
        SectionDescriptor::new("settings", "Paramètres & intégrations")
            .with_description("Automatisations, webhooks et API partenaires")
            .with_icon("⚙️")
            .requiring_roles(["superadmin"])
            .requiring_permissions(["settings:manage"]),
    ]
}

/// Errors raised while assembling a section table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionTableError {
    /// Two descriptors share a key.
    #[error("duplicate section key: {0}")]
    DuplicateKey(String),
    /// A descriptor has a blank key.
    #[error("section key must not be empty")]
    EmptyKey,
}

/// Ordered, key-unique list of section descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTable {
    sections: Vec<SectionDescriptor>,
}

impl SectionTable {
    /// Validate key uniqueness and build the table.
    pub fn new(sections: Vec<SectionDescriptor>) -> Result<Self, SectionTableError> {
        let mut seen = HashSet::with_capacity(sections.len());
        for section in &sections {
            if section.key.trim().is_empty() {
                return Err(SectionTableError::EmptyKey);
            }
            if !seen.insert(section.key.as_str()) {
                return Err(SectionTableError::DuplicateKey(section.key.clone()));
            }
        }
        Ok(Self { sections })
    }

    /// The built-in dashboard table.
    pub fn dashboard() -> Self {
        Self {
            sections: dashboard_sections(),
        }
    }

    /// Descriptors in display order.
    pub fn as_slice(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    /// Lookup a descriptor by key.
    pub fn get(&self, key: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|section| section.key == key)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the table has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_table_is_valid() {
        let table = SectionTable::new(dashboard_sections()).unwrap();
        assert_eq!(table, SectionTable::dashboard());
        assert_eq!(
            table
                .as_slice()
                .iter()
                .map(|s| s.key.as_str())
                .collect::<Vec<_>>(),
            ["overview", "events", "team", "settings"]
        );
        assert_eq!(
            table.get("team").unwrap().required_roles,
            vec!["superadmin".to_string()]
        );
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = SectionTable::new(vec![
            SectionDescriptor::new("events", "A"),
            SectionDescriptor::new("events", "B"),
        ])
        .unwrap_err();
        assert_eq!(err, SectionTableError::DuplicateKey("events".into()));
    }

    #[test]
    fn rejects_blank_keys() {
        let err = SectionTable::new(vec![SectionDescriptor::new("  ", "Blank")]).unwrap_err();
        assert_eq!(err, SectionTableError::EmptyKey);
    }
}
