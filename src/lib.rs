//! Workspace umbrella crate for license comparison.
//!
//! This crate stitches together text normalization, template parsing,
//! template matching and license-expression comparison so callers can check
//! license text and license expressions through a single API entry point.
//!
//! ```
//! use license_compare::{CatalogEntry, LicenseComparer};
//!
//! let mit_like = CatalogEntry::new(
//!     "Tiny-1.0",
//!     "Copyright (c) <year> <holder>\nPermission is granted to use this software.",
//! )
//! .with_template(
//!     "Copyright <<var;name=\"copyright\";original=\"(c) <year> <holder>\";match=\".{0,200}\">>\n\
//!      Permission is granted to use this software.",
//! );
//!
//! let comparer = LicenseComparer::default();
//! let file = "/*\n * Copyright (C) 2024 Jane Doe\n * Permission is granted to use this software.\n */";
//! let result = comparer.is_text_standard_license(&mit_like, file).expect("template parses");
//! assert!(!result.difference_found);
//! assert!(comparer.is_standard_license_within_text(&mit_like, &format!("fn main() {{}}\n{file}")));
//! ```

mod config;

pub use crate::config::{
    ConfigLoadError, LicenseCompareConfig, MatchYamlConfig, ScanYamlConfig, TextYamlConfig,
};
pub use expression::{
    LicenseExpression, TranslationMap, is_equal, passes_blacklist, passes_whitelist,
};
pub use matcher::{
    CatalogEntry, CatalogScanner, CompiledTemplate, DifferenceDescription, LicenseCatalog,
    MatchConfig, MatchError, ScanConfig, TemplateMatcher, compare, is_within_text,
    license_uri_to_id, matching_exception_ids, matching_exception_ids_within_text,
    matching_license_ids, matching_license_ids_within_text,
};
pub use template::{
    FilterSink, OptionalTextHandling, PlainTextSink, TemplateError, TemplateNode, TemplateSink,
    TreeBuilder, VarTextHandling, non_optional_text, parse as parse_template, parse_tree,
    template_to_text,
};
pub use text::{
    LineColumn, NormalizeConfig, TextError, Token, TokenizedText, is_single_token,
    locate_original_text, normalize, strip_comments, tokenize,
};

use thiserror::Error;
use tracing::warn;

/// Errors that can occur while comparing license text.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("configuration failure: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("matching failure: {0}")]
    Match(#[from] MatchError),
    #[error("template failure: {0}")]
    Template(#[from] TemplateError),
}

/// Compares text against standard licenses and exceptions with one
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct LicenseComparer {
    matcher: TemplateMatcher,
    scan: ScanConfig,
}

impl LicenseComparer {
    pub fn new(cfg: MatchConfig, scan: ScanConfig) -> Result<Self, CompareError> {
        Ok(Self {
            matcher: TemplateMatcher::new(cfg)?,
            scan,
        })
    }

    pub fn from_config(config: &LicenseCompareConfig) -> Result<Self, CompareError> {
        config.validate()?;
        Self::new(config.match_config(), config.scan_config())
    }

    /// Loads a YAML configuration file and builds a comparer from it.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CompareError> {
        Self::from_config(&LicenseCompareConfig::from_file(path)?)
    }

    pub fn matcher(&self) -> &TemplateMatcher {
        &self.matcher
    }

    pub fn scan_config(&self) -> ScanConfig {
        self.scan
    }

    /// Compares the whole of `text` against `template`.
    pub fn compare(&self, template: &str, text: &str) -> Result<DifferenceDescription, CompareError> {
        Ok(self.matcher.compare(template, text)?)
    }

    /// True if `template` matches somewhere inside `full_text`.
    pub fn is_within_text(&self, template: &str, full_text: &str) -> Result<bool, CompareError> {
        Ok(self.matcher.is_within_text(template, full_text)?)
    }

    /// Compares `text` against a standard license, using its template when
    /// it has a non-blank one and its plain text otherwise.
    pub fn is_text_standard_license(
        &self,
        license: &CatalogEntry,
        text: &str,
    ) -> Result<DifferenceDescription, CompareError> {
        self.compare_entry(license, text)
    }

    /// Exception counterpart of [`is_text_standard_license`](Self::is_text_standard_license).
    pub fn is_text_standard_exception(
        &self,
        exception: &CatalogEntry,
        text: &str,
    ) -> Result<DifferenceDescription, CompareError> {
        self.compare_entry(exception, text)
    }

    /// True if the license appears somewhere in `text`.
    ///
    /// Never fails: a malformed template is logged and reported as absent.
    pub fn is_standard_license_within_text(&self, license: &CatalogEntry, text: &str) -> bool {
        self.entry_within_text("license", license, text)
    }

    /// Exception counterpart of
    /// [`is_standard_license_within_text`](Self::is_standard_license_within_text).
    pub fn is_standard_exception_within_text(&self, exception: &CatalogEntry, text: &str) -> bool {
        self.entry_within_text("exception", exception, text)
    }

    /// A scanner over `catalog` sharing this comparer's configuration.
    pub fn scanner<'c>(&self, catalog: &'c LicenseCatalog) -> Result<CatalogScanner<'c>, CompareError> {
        Ok(CatalogScanner::with_config(
            catalog,
            self.matcher.config().clone(),
            self.scan,
        )?)
    }

    fn compare_entry(&self, entry: &CatalogEntry, text: &str) -> Result<DifferenceDescription, CompareError> {
        let compiled = entry.compiled(&self.matcher)?;
        Ok(self
            .matcher
            .compare_compiled(&compiled, &self.matcher.prepare(text)))
    }

    fn entry_within_text(&self, kind: &str, entry: &CatalogEntry, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        match entry.compiled(&self.matcher) {
            Ok(compiled) => self
                .matcher
                .contains_compiled(&compiled, &self.matcher.prepare(text)),
            Err(err) => {
                warn!(kind, id = entry.id(), error = %err, "could not check entry within text");
                false
            }
        }
    }
}

/// [`LicenseComparer::is_text_standard_license`] with the default configuration.
pub fn is_text_standard_license(
    license: &CatalogEntry,
    text: &str,
) -> Result<DifferenceDescription, CompareError> {
    LicenseComparer::default().is_text_standard_license(license, text)
}

/// [`LicenseComparer::is_text_standard_exception`] with the default configuration.
pub fn is_text_standard_exception(
    exception: &CatalogEntry,
    text: &str,
) -> Result<DifferenceDescription, CompareError> {
    LicenseComparer::default().is_text_standard_exception(exception, text)
}

/// [`LicenseComparer::is_standard_license_within_text`] with the default configuration.
pub fn is_standard_license_within_text(license: &CatalogEntry, text: &str) -> bool {
    LicenseComparer::default().is_standard_license_within_text(license, text)
}

/// [`LicenseComparer::is_standard_exception_within_text`] with the default configuration.
pub fn is_standard_exception_within_text(exception: &CatalogEntry, text: &str) -> bool {
    LicenseComparer::default().is_standard_exception_within_text(exception, text)
}

/// First normalized token of a license text, comment markers ignored.
pub fn first_license_token(text: &str) -> Option<String> {
    text::first_token(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CatalogEntry {
        CatalogEntry::new("Notice-1.0", "This notice must be kept.")
    }

    #[test]
    fn plain_text_entry_compares() {
        let result = is_text_standard_license(&entry(), "THIS NOTICE MUST BE KEPT.").unwrap();
        assert!(!result.difference_found);
        let result = is_text_standard_license(&entry(), "This notice may be dropped.").unwrap();
        assert!(result.difference_found);
    }

    #[test]
    fn malformed_template_is_an_error_for_compare_but_false_for_within() {
        let broken = entry().with_template("<<var;original=\"x\">> notice");
        assert!(matches!(
            is_text_standard_exception(&broken, "notice"),
            Err(CompareError::Match(MatchError::Template(_)))
        ));
        assert!(!is_standard_exception_within_text(&broken, "x notice"));
    }

    #[test]
    fn empty_text_is_never_within() {
        assert!(!is_standard_license_within_text(&entry(), ""));
        assert!(!is_standard_license_within_text(&entry(), " \n\t"));
    }

    #[test]
    fn first_token_skips_comment_markers() {
        assert_eq!(first_license_token("// Apache License"), Some("apache".to_string()));
        assert_eq!(first_license_token("  "), None);
    }

    #[test]
    fn comparer_from_config_uses_scan_settings() {
        let config = LicenseCompareConfig::from_yaml(
            "version: \"1\"\nscan:\n  parallel: false\n  include_deprecated: false\n",
        )
        .unwrap();
        let comparer = LicenseComparer::from_config(&config).unwrap();
        assert!(!comparer.scan_config().parallel);

        let catalog = LicenseCatalog::new()
            .with_license(entry())
            .with_license(CatalogEntry::new("Notice-0.9", "This notice must be kept.").with_deprecated(true));
        let ids = comparer
            .scanner(&catalog)
            .unwrap()
            .matching_license_ids("This notice must be kept.");
        assert_eq!(ids, vec!["Notice-1.0"]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = LicenseCompareConfig::default();
        config.version = "3".into();
        assert!(matches!(
            LicenseComparer::from_config(&config),
            Err(CompareError::Config(ConfigLoadError::UnsupportedVersion(_)))
        ));
    }
}
