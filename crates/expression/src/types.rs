use std::fmt;

use serde::{Deserialize, Serialize};

/// A license expression tree.
///
/// Sets are stored in the order they were written; comparison treats them as
/// unordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LicenseExpression {
    /// A license from the standard list, by identifier.
    Simple(String),
    /// A locally defined license (`LicenseRef-...`), by identifier.
    Custom(String),
    /// All members apply (`A AND B`).
    Conjunctive(Vec<LicenseExpression>),
    /// Any one member applies (`A OR B`).
    Disjunctive(Vec<LicenseExpression>),
    NoAssertion,
    None,
    /// `license WITH exception`.
    WithException {
        license: Box<LicenseExpression>,
        exception: String,
    },
    /// `license+`: this version or any later one.
    OrLater(Box<LicenseExpression>),
}

impl LicenseExpression {
    pub fn simple(id: impl Into<String>) -> Self {
        Self::Simple(id.into())
    }

    pub fn custom(id: impl Into<String>) -> Self {
        Self::Custom(id.into())
    }

    pub fn all_of(members: impl IntoIterator<Item = LicenseExpression>) -> Self {
        Self::Conjunctive(members.into_iter().collect())
    }

    pub fn any_of(members: impl IntoIterator<Item = LicenseExpression>) -> Self {
        Self::Disjunctive(members.into_iter().collect())
    }

    pub fn with_exception(license: LicenseExpression, exception: impl Into<String>) -> Self {
        Self::WithException {
            license: Box::new(license),
            exception: exception.into(),
        }
    }

    pub fn or_later(license: LicenseExpression) -> Self {
        Self::OrLater(Box::new(license))
    }

    /// True for `AND` and `OR` sets.
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Conjunctive(_) | Self::Disjunctive(_))
    }

    /// Writes `self` as an operand, in parentheses when it is a set with more
    /// than one member.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conjunctive(members) | Self::Disjunctive(members) if members.len() > 1 => {
                write!(f, "({self})")
            }
            _ => write!(f, "{self}"),
        }
    }
}

fn fmt_members(
    f: &mut fmt::Formatter<'_>,
    members: &[LicenseExpression],
    operator: &str,
) -> fmt::Result {
    for (idx, member) in members.iter().enumerate() {
        if idx > 0 {
            write!(f, " {operator} ")?;
        }
        member.fmt_operand(f)?;
    }
    Ok(())
}

impl fmt::Display for LicenseExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(id) | Self::Custom(id) => f.write_str(id),
            Self::Conjunctive(members) => fmt_members(f, members, "AND"),
            Self::Disjunctive(members) => fmt_members(f, members, "OR"),
            Self::NoAssertion => f.write_str("NOASSERTION"),
            Self::None => f.write_str("NONE"),
            Self::WithException { license, exception } => {
                license.fmt_operand(f)?;
                write!(f, " WITH {exception}")
            }
            Self::OrLater(license) => {
                license.fmt_operand(f)?;
                f.write_str("+")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_spdx_text() {
        let expr = LicenseExpression::all_of([
            LicenseExpression::simple("MIT"),
            LicenseExpression::any_of([
                LicenseExpression::simple("Apache-2.0"),
                LicenseExpression::with_exception(
                    LicenseExpression::simple("GPL-2.0-only"),
                    "Classpath-exception-2.0",
                ),
            ]),
            LicenseExpression::or_later(LicenseExpression::simple("LGPL-2.1")),
        ]);
        assert_eq!(
            expr.to_string(),
            "MIT AND (Apache-2.0 OR GPL-2.0-only WITH Classpath-exception-2.0) AND LGPL-2.1+"
        );
    }

    #[test]
    fn renders_special_values() {
        assert_eq!(LicenseExpression::NoAssertion.to_string(), "NOASSERTION");
        assert_eq!(LicenseExpression::None.to_string(), "NONE");
        assert_eq!(
            LicenseExpression::custom("LicenseRef-acme").to_string(),
            "LicenseRef-acme"
        );
    }

    #[test]
    fn single_member_sets_are_not_parenthesized() {
        let expr = LicenseExpression::any_of([
            LicenseExpression::all_of([LicenseExpression::simple("MIT")]),
            LicenseExpression::simple("BSD-2-Clause"),
        ]);
        assert_eq!(expr.to_string(), "MIT OR BSD-2-Clause");
        assert!(expr.is_set());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let expr = LicenseExpression::simple("MIT");
        let json = serde_json::to_string(&expr).expect("serialize");
        assert_eq!(json, r#"{"kind":"simple","value":"MIT"}"#);
        let back: LicenseExpression = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, expr);
    }
}
