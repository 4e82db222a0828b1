//! # License Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` decides whether a text is an instance of a license template. It
//! sits on top of `text` (normalization and tokenization) and `template`
//! (template grammar), and answers three questions:
//!
//! - Does this whole text match this template? ([`compare`])
//! - Does this template appear somewhere inside this text? ([`is_within_text`])
//! - Which catalog entries does this text match or contain?
//!   ([`CatalogScanner`])
//!
//! A non-matching text is not an error. It yields a [`DifferenceDescription`]
//! naming the furthest point any interpretation of the template reached, with
//! the line and column of the offending text.
//!
//! ## Core Types
//!
//! - [`MatchConfig`]: context window for messages plus the normalization rules.
//! - [`TemplateMatcher`]: compiles templates and compares them against text.
//! - [`CompiledTemplate`]: a parsed template, reusable across many texts.
//! - [`LicenseCatalog`] / [`CatalogEntry`]: the standard licenses and
//!   exceptions, each caching its compiled template.
//! - [`CatalogScanner`] / [`ScanConfig`]: catalog-wide scans, parallel with
//!   the `parallel` feature.
//!
//! ## Matching rules
//!
//! - Optional regions are tried present first, then absent.
//! - Variables take the longest span their pattern accepts that lets the rest
//!   of the template match.
//! - Intermediate results are memoized, so deeply nested optional regions stay
//!   polynomial.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{compare, CatalogEntry, CatalogScanner, LicenseCatalog};
//!
//! let template = "Copyright <<var;name=\"copyright\";original=\"(c) 2020 Acme\";match=\".{0,120}\">>\n\
//!     Permission is granted<<beginOptional>>, free of charge,<<endOptional>> to use this software.";
//!
//! let result = compare(template, "// Copyright 2024 Jane Doe\n// Permission is granted to use this software.")
//!     .expect("template parses");
//! assert!(!result.difference_found);
//!
//! let catalog = LicenseCatalog::new()
//!     .with_license(CatalogEntry::new("Tiny-1.0", "Tiny license.").with_template(template));
//! let ids = CatalogScanner::new(&catalog)
//!     .matching_license_ids("Copyright 1999 X\nPermission is granted, free of charge, to use this software.");
//! assert_eq!(ids, vec!["Tiny-1.0"]);
//! ```

mod catalog;
mod compile;
mod engine;
mod types;

pub use crate::catalog::{
    license_uri_to_id, matching_exception_ids, matching_exception_ids_within_text,
    matching_license_ids, matching_license_ids_within_text, CatalogEntry, CatalogScanner,
    LicenseCatalog,
};
pub use crate::compile::CompiledTemplate;
pub use crate::engine::{compare, is_within_text, TemplateMatcher};
pub use crate::types::{DifferenceDescription, MatchConfig, MatchError, ScanConfig};
pub use template::TemplateError;
pub use text::{LineColumn, NormalizeConfig, TokenizedText};
