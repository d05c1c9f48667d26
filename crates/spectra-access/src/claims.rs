//! ---
//! spx_section: "06-security-access-control"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Claim-driven access rules for the admin dashboard."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

/// Role that satisfies every permission requirement.
pub const SUPER_ADMIN_ROLE: &str = "superadmin";

/// Normalised custom claims of one authenticated principal.
///
/// Roles and permissions are trimmed and lower-cased on the way in, so
/// membership is a plain set lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSet {
    is_admin: bool,
    roles: BTreeSet<String>,
    permissions: BTreeSet<String>,
}

impl ClaimSet {
    /// Build a claim set from already-split values.
    pub fn new<R, P>(is_admin: bool, roles: R, permissions: P) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            is_admin,
            roles: normalise_all(roles),
            permissions: normalise_all(permissions),
        }
    }

    /// Principal without any claim.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Read the `admin`, `roles`, and `permissions` custom claims from a
    /// decoded token payload.
    ///
    /// Never fails: a non-object payload, a non-boolean `admin`, non-string
    /// list entries, and blank entries are all ignored.
    pub fn from_claims(payload: &Value) -> Self {
        let Some(object) = payload.as_object() else {
            return Self::anonymous();
        };
        Self {
            is_admin: matches!(object.get("admin"), Some(Value::Bool(true))),
            roles: claim_list(object.get("roles")),
            permissions: claim_list(object.get("permissions")),
        }
    }

    /// Coarse admin flag.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Normalised role names.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    /// Normalised permission names.
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Case-insensitive role membership.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(&normalise(role))
    }

    /// Case-insensitive permission membership.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(&normalise(permission))
    }

    /// Whether at least one role or permission has been assigned.
    ///
    /// Without granular rules every check collapses to [`Self::is_admin`].
    pub fn has_granular_rules(&self) -> bool {
        !self.roles.is_empty() || !self.permissions.is_empty()
    }

    /// Whether the principal holds the [`SUPER_ADMIN_ROLE`].
    pub fn is_super_admin(&self) -> bool {
        self.roles.contains(SUPER_ADMIN_ROLE)
    }
}

fn normalise(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalise_all<I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| normalise(value.as_ref()))
        .filter(|value| !value.is_empty())
        .collect()
}

/// Claims arrive either as `"a, b"` or `["a", "b"]`.
fn claim_list(value: Option<&Value>) -> BTreeSet<String> {
    match value {
        Some(Value::Array(items)) => normalise_all(items.iter().filter_map(Value::as_str)),
        Some(Value::String(joined)) => normalise_all(joined.split(',')),
        _ => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_comma_separated_strings() {
        let claims = ClaimSet::from_claims(&json!({
            "admin": true,
            "roles": " Mall-Manager , marketing,, ",
            "permissions": "events:read"
        }));
        assert!(claims.is_admin());
        assert_eq!(claims.roles().collect::<Vec<_>>(), ["mall-manager", "marketing"]);
        assert!(claims.has_permission("EVENTS:READ"));
    }

    #[test]
    fn drops_malformed_entries() {
        let claims = ClaimSet::from_claims(&json!({
            "admin": "yes",
            "roles": ["SuperAdmin", 42, null, "", "  "],
            "permissions": {"events:read": true}
        }));
        assert!(!claims.is_admin());
        assert!(claims.is_super_admin());
        assert_eq!(claims.roles().count(), 1);
        assert_eq!(claims.permissions().count(), 0);
    }

    #[test]
    fn missing_claims_default_to_empty() {
        let claims = ClaimSet::from_claims(&json!({}));
        assert_eq!(claims, ClaimSet::anonymous());
        assert!(!claims.has_granular_rules());

        let claims = ClaimSet::from_claims(&json!("not an object"));
        assert_eq!(claims, ClaimSet::anonymous());
    }

    #[test]
    fn membership_ignores_case_and_padding() {
        let claims = ClaimSet::new(false, ["Team-Admin"], Vec::<String>::new());
        assert!(claims.has_role(" team-admin "));
        assert!(claims.has_role("TEAM-ADMIN"));
        assert!(claims.has_granular_rules());
    }
}
