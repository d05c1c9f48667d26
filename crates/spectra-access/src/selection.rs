//! ---
//! spx_section: "06-security-access-control"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Claim-driven access rules for the admin dashboard."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use crate::evaluator::AccessDecision;

/// Keep `current` while it exists and stays accessible; otherwise fall back
/// to the first accessible section, or to no selection at all.
pub fn select_section<'a>(current: Option<&str>, decisions: &'a [AccessDecision]) -> Option<&'a str> {
    if let Some(key) = current {
        if let Some(decision) = decisions.iter().find(|d| d.key == key && d.accessible) {
            return Some(decision.key.as_str());
        }
    }
    decisions
        .iter()
        .find(|decision| decision.accessible)
        .map(|decision| decision.key.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(key: &str, accessible: bool) -> AccessDecision {
        AccessDecision {
            key: key.into(),
            accessible,
            reason: None,
        }
    }

    #[test]
    fn keeps_accessible_selection() {
        let decisions = [decision("overview", true), decision("events", true)];
        assert_eq!(select_section(Some("events"), &decisions), Some("events"));
    }

    #[test]
    fn falls_back_when_selection_locked_or_unknown() {
        let decisions = [
            decision("overview", false),
            decision("events", true),
            decision("team", false),
        ];
        assert_eq!(select_section(Some("team"), &decisions), Some("events"));
        assert_eq!(select_section(Some("gone"), &decisions), Some("events"));
        assert_eq!(select_section(None, &decisions), Some("events"));
    }

    #[test]
    fn nothing_accessible_means_no_selection() {
        let decisions = [decision("overview", false)];
        assert_eq!(select_section(Some("overview"), &decisions), None);
        assert_eq!(select_section(None, &[]), None);
    }
}
