//! ---
//! spx_section: "06-security-access-control"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Claim-driven access rules for the admin dashboard."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use serde::Serialize;

use crate::claims::ClaimSet;

/// Category of action summarised by a capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Read the events calendar.
    ViewEvents,
    /// Create, edit, and delete events.
    ManageEvents,
    /// Administer dashboard members.
    ManageTeam,
    /// Open integrations and settings.
    AccessSettings,
}

/// Grants for a capability in granular mode: any listed permission or any
/// listed role is enough. Superadmins always qualify.
struct CapabilityRule {
    capability: Capability,
    permissions: &'static [&'static str],
    roles: &'static [&'static str],
}

/// Indexed by `Capability as usize`.
static RULES: [CapabilityRule; 4] = [
    CapabilityRule {
        capability: Capability::ViewEvents,
        permissions: &["events:read"],
        roles: &[],
    },
    CapabilityRule {
        capability: Capability::ManageEvents,
        permissions: &["events:write"],
        roles: &[],
    },
    CapabilityRule {
        capability: Capability::ManageTeam,
        permissions: &["team:write"],
        roles: &["team-admin"],
    },
    CapabilityRule {
        capability: Capability::AccessSettings,
        permissions: &["settings:manage"],
        roles: &[],
    },
];

impl Capability {
    /// All capabilities, in display order.
    pub const ALL: [Capability; 4] = [
        Capability::ViewEvents,
        Capability::ManageEvents,
        Capability::ManageTeam,
        Capability::AccessSettings,
    ];

    fn rule(self) -> &'static CapabilityRule {
        let rule = &RULES[self as usize];
        debug_assert_eq!(rule.capability, self);
        rule
    }

    /// Whether the claims grant this capability.
    pub fn is_granted(self, claims: &ClaimSet) -> bool {
        if !claims.has_granular_rules() {
            return claims.is_admin();
        }
        let rule = self.rule();
        claims.is_super_admin()
            || rule.permissions.iter().any(|p| claims.has_permission(p))
            || rule.roles.iter().any(|r| claims.has_role(r))
    }
}

/// Summary flags exposed to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// [`Capability::ViewEvents`].
    pub can_view_events: bool,
    /// [`Capability::ManageEvents`].
    pub can_manage_events: bool,
    /// [`Capability::ManageTeam`].
    pub can_manage_team: bool,
    /// [`Capability::AccessSettings`].
    pub can_access_settings: bool,
}

impl Capabilities {
    /// Evaluate every capability for the claims.
    pub fn for_claims(claims: &ClaimSet) -> Self {
        Self {
            can_view_events: Capability::ViewEvents.is_granted(claims),
            can_manage_events: Capability::ManageEvents.is_granted(claims),
            can_manage_team: Capability::ManageTeam.is_granted(claims),
            can_access_settings: Capability::AccessSettings.is_granted(claims),
        }
    }

    /// Flag for a single capability.
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewEvents => self.can_view_events,
            Capability::ManageEvents => self.can_manage_events,
            Capability::ManageTeam => self.can_manage_team,
            Capability::AccessSettings => self.can_access_settings,
        }
    }

    /// Whether every flag is set.
    pub fn all(&self) -> bool {
        Capability::ALL.iter().all(|capability| self.get(*capability))
    }
}
