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
use crate::sections::SectionDescriptor;

/// Shown when a section is locked without any listed requirement to blame.
pub const RESTRICTED_REASON: &str = "Accès restreint aux administrateurs avancés.";

const REASON_SEPARATOR: &str = " · ";

/// Outcome for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    /// Section key.
    pub key: String,
    /// Whether the principal may open the section.
    pub accessible: bool,
    /// Why the section is locked; `None` when accessible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Every required permission is held. Superadmins always pass.
pub fn meets_permissions(claims: &ClaimSet, required: &[String]) -> bool {
    claims.is_super_admin()
        || required
            .iter()
            .all(|permission| claims.has_permission(permission))
}

/// At least one required role is held, or none is required.
pub fn meets_roles(claims: &ClaimSet, required: &[String]) -> bool {
    required.is_empty() || required.iter().any(|role| claims.has_role(role))
}

/// Decide every section in descriptor order. Never fails.
pub fn evaluate(claims: &ClaimSet, sections: &[SectionDescriptor]) -> Vec<AccessDecision> {
    let granular = claims.has_granular_rules();
    sections
        .iter()
        .map(|section| {
            if granular {
                decide_granular(claims, section)
            } else {
                decide_coarse(claims, section)
            }
        })
        .collect()
}

fn decide_coarse(claims: &ClaimSet, section: &SectionDescriptor) -> AccessDecision {
    let accessible = claims.is_admin();
    AccessDecision {
        key: section.key.clone(),
        accessible,
        reason: (!accessible).then(|| RESTRICTED_REASON.to_owned()),
    }
}

fn decide_granular(claims: &ClaimSet, section: &SectionDescriptor) -> AccessDecision {
    let permissions_ok = meets_permissions(claims, &section.required_permissions);
    let roles_ok = meets_roles(claims, &section.required_roles);
    let accessible = permissions_ok && roles_ok;

    let reason = (!accessible).then(|| {
        let mut reasons = Vec::with_capacity(2);
        if !permissions_ok {
            let missing = section
                .required_permissions
                .iter()
                .filter(|permission| !claims.has_permission(permission))
                .map(String::as_str)
                .collect::<Vec<_>>();
            reasons.push(format!("Permissions: {}", missing.join(", ")));
        }
        if !roles_ok {
            reasons.push(format!("Rôles: {}", section.required_roles.join(", ")));
        }
        if reasons.is_empty() {
            reasons.push(RESTRICTED_REASON.to_owned());
        }
        reasons.join(REASON_SEPARATOR)
    });

    AccessDecision {
        key: section.key.clone(),
        accessible,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::dashboard_sections;

    const NONE: [&str; 0] = [];

    fn decision<'a>(decisions: &'a [AccessDecision], key: &str) -> &'a AccessDecision {
        decisions.iter().find(|d| d.key == key).unwrap()
    }

    #[test]
    fn coarse_mode_follows_admin_flag() {
        let sections = dashboard_sections();
        let admin = evaluate(&ClaimSet::new(true, NONE, NONE), &sections);
        assert!(admin.iter().all(|d| d.accessible && d.reason.is_none()));

        let visitor = evaluate(&ClaimSet::anonymous(), &sections);
        assert!(visitor
            .iter()
            .all(|d| !d.accessible && d.reason.as_deref() == Some(RESTRICTED_REASON)));
    }

    #[test]
    fn read_permission_unlocks_event_sections_only() {
        let claims = ClaimSet::new(false, NONE, ["events:read"]);
        let decisions = evaluate(&claims, &dashboard_sections());

        assert!(decision(&decisions, "overview").accessible);
        assert!(decision(&decisions, "events").accessible);

        let team = decision(&decisions, "team");
        assert!(!team.accessible);
        let reason = team.reason.as_deref().unwrap();
        assert!(reason.contains("superadmin"));
        assert!(reason.contains("team:read"));
        assert_eq!(reason, "Permissions: team:read · Rôles: superadmin");
    }

    #[test]
    fn superadmin_bypasses_permissions_but_roles_still_apply() {
        let claims = ClaimSet::new(false, ["SuperAdmin"], NONE);
        let decisions = evaluate(&claims, &dashboard_sections());
        assert!(decisions.iter().all(|d| d.accessible));

        let custom = vec![SectionDescriptor::new("billing", "Billing")
            .requiring_roles(["finance"])
            .requiring_permissions(["billing:read"])];
        let decisions = evaluate(&claims, &custom);
        assert!(!decisions[0].accessible);
        assert_eq!(decisions[0].reason.as_deref(), Some("Rôles: finance"));
    }

    #[test]
    fn granular_mode_ignores_admin_flag() {
        let claims = ClaimSet::new(true, ["marketing"], NONE);
        let decisions = evaluate(&claims, &dashboard_sections());
        assert!(decisions.iter().all(|d| !d.accessible));
        assert_eq!(
            decision(&decisions, "overview").reason.as_deref(),
            Some("Permissions: events:read")
        );
    }

    #[test]
    fn any_role_and_all_permissions() {
        let section = SectionDescriptor::new("reports", "Reports")
            .requiring_roles(["analyst", "auditor"])
            .requiring_permissions(["reports:read", "reports:export"]);

        let partial = ClaimSet::new(false, ["auditor"], ["reports:read"]);
        let decisions = evaluate(&partial, std::slice::from_ref(&section));
        assert!(!decisions[0].accessible);
        assert_eq!(
            decisions[0].reason.as_deref(),
            Some("Permissions: reports:export")
        );

        let full = ClaimSet::new(false, ["auditor"], ["reports:read", "reports:export"]);
        assert!(evaluate(&full, std::slice::from_ref(&section))[0].accessible);
    }

    #[test]
    fn unrestricted_section_opens_for_any_granular_principal() {
        let section = SectionDescriptor::new("help", "Help");
        let claims = ClaimSet::new(false, ["marketing"], NONE);
        assert!(evaluate(&claims, &[section])[0].accessible);
    }
}
