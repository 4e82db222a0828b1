use crate::types::LicenseExpression;

/// True unless the expression forces the use of a listed license.
///
/// An `AND` set passes when every member passes; an `OR` set passes when at
/// least one member does, since the other alternatives can be chosen. Leaves
/// are checked by their SPDX text. An empty list lets everything through.
pub fn passes_blacklist<S: AsRef<str>>(expr: &LicenseExpression, blacklist: &[S]) -> bool {
    if blacklist.is_empty() {
        return true;
    }
    passes(expr, &|leaf| !contains(blacklist, leaf))
}

/// True if the expression can be satisfied using only listed licenses.
///
/// Same set rules as [`passes_blacklist`]. An empty list lets nothing through.
pub fn passes_whitelist<S: AsRef<str>>(expr: &LicenseExpression, whitelist: &[S]) -> bool {
    if whitelist.is_empty() {
        return false;
    }
    passes(expr, &|leaf| contains(whitelist, leaf))
}

fn passes(expr: &LicenseExpression, leaf_passes: &dyn Fn(&str) -> bool) -> bool {
    match expr {
        LicenseExpression::Conjunctive(members) => {
            members.iter().all(|member| passes(member, leaf_passes))
        }
        LicenseExpression::Disjunctive(members) => {
            members.iter().any(|member| passes(member, leaf_passes))
        }
        leaf => leaf_passes(&leaf.to_string()),
    }
}

fn contains<S: AsRef<str>>(list: &[S], leaf: &str) -> bool {
    list.iter().any(|item| item.as_ref() == leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use LicenseExpression as E;

    fn mit_and_gpl() -> LicenseExpression {
        E::all_of([E::simple("MIT"), E::simple("GPL-3.0-only")])
    }

    #[test]
    fn conjunction_fails_blacklist_if_any_member_is_listed() {
        assert!(!passes_blacklist(&mit_and_gpl(), &["GPL-3.0-only"]));
        assert!(passes_blacklist(&mit_and_gpl(), &["AGPL-3.0-only"]));
    }

    #[test]
    fn disjunction_passes_blacklist_if_any_member_is_allowed() {
        let expr = E::any_of([E::simple("MIT"), E::simple("GPL-3.0-only")]);
        assert!(passes_blacklist(&expr, &["GPL-3.0-only"]));
        assert!(!passes_blacklist(&expr, &["GPL-3.0-only", "MIT"]));
    }

    #[test]
    fn whitelist_requires_a_fully_listed_choice() {
        let expr = E::any_of([
            mit_and_gpl(),
            E::simple("Apache-2.0"),
        ]);
        assert!(passes_whitelist(&expr, &["Apache-2.0"]));
        assert!(passes_whitelist(&expr, &["MIT", "GPL-3.0-only"]));
        assert!(!passes_whitelist(&expr, &["MIT"]));
    }

    #[test]
    fn empty_lists() {
        let empty: [&str; 0] = [];
        assert!(passes_blacklist(&mit_and_gpl(), &empty));
        assert!(!passes_whitelist(&mit_and_gpl(), &empty));
    }

    #[test]
    fn leaves_compare_by_spdx_text() {
        let expr = E::with_exception(E::simple("GPL-2.0-only"), "Classpath-exception-2.0");
        let listed = vec!["GPL-2.0-only WITH Classpath-exception-2.0".to_string()];
        assert!(passes_whitelist(&expr, &listed[..]));
        assert!(passes_blacklist(&expr, &["GPL-2.0-only"]));
        assert!(passes_whitelist(&E::NoAssertion, &["NOASSERTION"]));
    }
}
