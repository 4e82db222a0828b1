//! License expression equivalence and policy checks.
//!
//! Two expressions are equal when they describe the same licensing terms,
//! whatever order their `AND`/`OR` members were written in and whatever local
//! identifiers the two sides use for their custom licenses:
//!
//! ```
//! use expression::{is_equal, LicenseExpression as E, TranslationMap};
//!
//! let ours = E::all_of([E::simple("MIT"), E::custom("LicenseRef-internal")]);
//! let theirs = E::all_of([E::custom("LicenseRef-7"), E::simple("MIT")]);
//!
//! let mut translation = TranslationMap::new();
//! translation.insert("LicenseRef-internal".into(), "LicenseRef-7".into());
//! assert!(is_equal(&ours, &theirs, &translation));
//! ```
//!
//! [`passes_blacklist`] and [`passes_whitelist`] decide whether an expression
//! can be complied with given a list of forbidden or allowed licenses.

mod compare;
mod policy;
mod types;

pub use crate::compare::{is_equal, TranslationMap};
pub use crate::policy::{passes_blacklist, passes_whitelist};
pub use crate::types::LicenseExpression;
