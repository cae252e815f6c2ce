//! Effective ignore-code computation.
//!
//! With `use_sane_defaults` enabled the user's codes *toggle* a runner's
//! built-in defaults: the effective set is the symmetric difference of the
//! two. Naming a default-ignored code therefore re-enables it, and naming a
//! code that is also a default cancels out. This surprises users who list a
//! default code expecting it to stay ignored; it is kept for compatibility
//! with existing project files.

use std::collections::BTreeSet;

/// Codes suppressed for one runner.
pub fn effective_ignore_codes(
    user: &BTreeSet<String>,
    defaults: &[&str],
    use_sane_defaults: bool,
) -> BTreeSet<String> {
    if !use_sane_defaults {
        return user.clone();
    }
    let defaults: BTreeSet<String> = defaults.iter().map(|c| c.to_string()).collect();
    user.symmetric_difference(&defaults).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_without_sane_defaults_user_set_is_used() {
        let out = effective_ignore_codes(&set(&["E501"]), &["C0111"], false);
        assert_eq!(out, set(&["E501"]));
    }

    #[test]
    fn test_symmetric_difference() {
        let user = set(&["C0111", "E501"]);
        let out = effective_ignore_codes(&user, &["C0111", "R0201"], true);
        // C0111 is in both and is therefore reported again
        assert_eq!(out, set(&["E501", "R0201"]));
    }

    #[test]
    fn test_equal_sets_cancel_out() {
        let defaults = ["C0103", "C0111"];
        let out = effective_ignore_codes(&set(&defaults), &defaults, true);
        assert!(out.is_empty());
    }

    #[test]
    fn test_membership_matches_exactly_one_side() {
        let user = set(&["A1", "B2", "C3"]);
        let defaults = ["B2", "D4"];
        let out = effective_ignore_codes(&user, &defaults, true);
        for code in ["A1", "B2", "C3", "D4", "E5"] {
            let in_user = user.contains(code);
            let in_default = defaults.contains(&code);
            assert_eq!(out.contains(code), in_user ^ in_default, "code {code}");
        }
    }
}
