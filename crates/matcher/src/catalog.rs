//! License and exception catalogs, and scans that find which entries a text
//! matches or contains.

use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use text::TokenizedText;
use tracing::{info, warn, Level};

use crate::compile::CompiledTemplate;
use crate::engine::TemplateMatcher;
use crate::types::{MatchConfig, MatchError, ScanConfig};

const LICENSE_NAMESPACES: [&str; 2] = ["http://spdx.org/licenses/", "https://spdx.org/licenses/"];

/// A standard license or exception: its identifier, plain text and optional
/// template.
///
/// The compiled template is cached on first use, so concurrent scans over the
/// same catalog compile each entry once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    id: String,
    text: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    deprecated: bool,
    #[serde(skip)]
    compiled: OnceCell<Result<Arc<CompiledTemplate>, MatchError>>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            template: None,
            deprecated: false,
            compiled: OnceCell::new(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self.compiled = OnceCell::new();
        self
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// The template when it is present and not blank, the plain text otherwise.
    pub fn match_source(&self) -> &str {
        match self.template.as_deref() {
            Some(template) if !template.trim().is_empty() => template,
            _ => &self.text,
        }
    }

    /// Compiled form of [`match_source`](Self::match_source) for `matcher`.
    ///
    /// The first result is cached. A matcher whose normalization differs from
    /// the cached one gets a fresh, uncached compilation.
    pub fn compiled(&self, matcher: &TemplateMatcher) -> Result<Arc<CompiledTemplate>, MatchError> {
        let cached = self
            .compiled
            .get_or_init(|| matcher.compile(self.match_source()).map(Arc::new));
        match cached {
            Ok(compiled) if compiled.normalize_config() == &matcher.config().normalize => {
                Ok(Arc::clone(compiled))
            }
            Ok(_) => matcher.compile(self.match_source()).map(Arc::new),
            Err(err) => Err(err.clone()),
        }
    }
}

/// The standard licenses and exceptions to scan against.
///
/// Entries keep their insertion order; scan results follow it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseCatalog {
    #[serde(default)]
    licenses: Vec<CatalogEntry>,
    #[serde(default)]
    exceptions: Vec<CatalogEntry>,
}

impl LicenseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_license(&mut self, entry: CatalogEntry) {
        self.licenses.push(entry);
    }

    pub fn add_exception(&mut self, entry: CatalogEntry) {
        self.exceptions.push(entry);
    }

    pub fn with_license(mut self, entry: CatalogEntry) -> Self {
        self.add_license(entry);
        self
    }

    pub fn with_exception(mut self, entry: CatalogEntry) -> Self {
        self.add_exception(entry);
        self
    }

    pub fn licenses(&self) -> &[CatalogEntry] {
        &self.licenses
    }

    pub fn exceptions(&self) -> &[CatalogEntry] {
        &self.exceptions
    }

    /// Looks up a license by identifier, ignoring ASCII case.
    pub fn license(&self, id: &str) -> Option<&CatalogEntry> {
        find(&self.licenses, id)
    }

    /// Looks up an exception by identifier, ignoring ASCII case.
    pub fn exception(&self, id: &str) -> Option<&CatalogEntry> {
        find(&self.exceptions, id)
    }
}

fn find<'c>(entries: &'c [CatalogEntry], id: &str) -> Option<&'c CatalogEntry> {
    entries.iter().find(|entry| entry.id.eq_ignore_ascii_case(id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    Exact,
    Contains,
}

/// Runs texts against every entry of a catalog.
#[derive(Debug, Clone)]
pub struct CatalogScanner<'c> {
    catalog: &'c LicenseCatalog,
    matcher: TemplateMatcher,
    scan: ScanConfig,
}

impl<'c> CatalogScanner<'c> {
    /// Scanner with the default match and scan configuration.
    pub fn new(catalog: &'c LicenseCatalog) -> Self {
        Self {
            catalog,
            matcher: TemplateMatcher::default(),
            scan: ScanConfig::default(),
        }
    }

    pub fn with_config(
        catalog: &'c LicenseCatalog,
        cfg: MatchConfig,
        scan: ScanConfig,
    ) -> Result<Self, MatchError> {
        Ok(Self {
            catalog,
            matcher: TemplateMatcher::new(cfg)?,
            scan,
        })
    }

    pub fn matcher(&self) -> &TemplateMatcher {
        &self.matcher
    }

    /// Identifiers of the licenses whose template matches the whole of `text`.
    pub fn matching_license_ids(&self, text: &str) -> Vec<String> {
        self.run_scan("license", &self.catalog.licenses, text, None, ScanMode::Exact)
    }

    /// Identifiers of the exceptions whose template matches the whole of `text`.
    pub fn matching_exception_ids(&self, text: &str) -> Vec<String> {
        self.run_scan("exception", &self.catalog.exceptions, text, None, ScanMode::Exact)
    }

    /// Identifiers of the licenses found anywhere in `text`, limited to
    /// `targets` when given.
    pub fn matching_license_ids_within_text(&self, text: &str, targets: Option<&[&str]>) -> Vec<String> {
        self.run_scan("license", &self.catalog.licenses, text, targets, ScanMode::Contains)
    }

    /// Identifiers of the exceptions found anywhere in `text`, limited to
    /// `targets` when given.
    pub fn matching_exception_ids_within_text(&self, text: &str, targets: Option<&[&str]>) -> Vec<String> {
        self.run_scan("exception", &self.catalog.exceptions, text, targets, ScanMode::Contains)
    }

    fn run_scan(
        &self,
        kind: &'static str,
        entries: &[CatalogEntry],
        text: &str,
        targets: Option<&[&str]>,
        mode: ScanMode,
    ) -> Vec<String> {
        let start = Instant::now();
        let span = tracing::span!(Level::INFO, "matcher.scan", kind, ?mode);
        let _guard = span.enter();

        if let Some(targets) = targets {
            for target in targets.iter().filter(|target| find(entries, target).is_none()) {
                warn!(kind, id = %target, "scan target not in catalog");
            }
        }

        let selected: Vec<&CatalogEntry> = entries
            .iter()
            .filter(|entry| self.scan.include_deprecated || !entry.deprecated)
            .filter(|entry| {
                targets.is_none_or(|targets| {
                    targets
                        .iter()
                        .any(|target| entry.id.eq_ignore_ascii_case(target))
                })
            })
            .collect();
        let prepared = self.matcher.prepare(text);

        let matches = self.check_all(&selected, &prepared, mode);

        info!(
            kind,
            entries = selected.len(),
            matches = matches.len(),
            candidate_tokens = prepared.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "catalog_scan"
        );
        matches
    }

    fn check_all(&self, selected: &[&CatalogEntry], prepared: &TokenizedText, mode: ScanMode) -> Vec<String> {
        #[cfg(feature = "parallel")]
        {
            if self.scan.parallel {
                return selected
                    .par_iter()
                    .filter(|entry| self.check(entry, prepared, mode))
                    .map(|entry| entry.id.clone())
                    .collect();
            }
        }

        selected
            .iter()
            .filter(|entry| self.check(entry, prepared, mode))
            .map(|entry| entry.id.clone())
            .collect()
    }

    fn check(&self, entry: &CatalogEntry, prepared: &TokenizedText, mode: ScanMode) -> bool {
        let compiled = match entry.compiled(&self.matcher) {
            Ok(compiled) => compiled,
            Err(err) => {
                warn!(id = entry.id(), error = %err, "skipping catalog entry with malformed template");
                return false;
            }
        };
        match mode {
            ScanMode::Exact => {
                // Cheap first-token check before the full walk.
                if let Some(first) = compiled.leading_token(compiled.entry()) {
                    if prepared.token(0).is_some_and(|token| token.text != first) {
                        return false;
                    }
                }
                !self
                    .matcher
                    .compare_compiled(&compiled, prepared)
                    .difference_found
            }
            ScanMode::Contains => self.matcher.contains_compiled(&compiled, prepared),
        }
    }
}

/// Licenses in `catalog` matching the whole of `text`, default configuration.
pub fn matching_license_ids(catalog: &LicenseCatalog, text: &str) -> Vec<String> {
    CatalogScanner::new(catalog).matching_license_ids(text)
}

/// Exceptions in `catalog` matching the whole of `text`, default configuration.
pub fn matching_exception_ids(catalog: &LicenseCatalog, text: &str) -> Vec<String> {
    CatalogScanner::new(catalog).matching_exception_ids(text)
}

/// Licenses from `catalog` (or just `targets`) found anywhere in `text`.
pub fn matching_license_ids_within_text(
    catalog: &LicenseCatalog,
    text: &str,
    targets: Option<&[&str]>,
) -> Vec<String> {
    CatalogScanner::new(catalog).matching_license_ids_within_text(text, targets)
}

/// Exceptions from `catalog` (or just `targets`) found anywhere in `text`.
pub fn matching_exception_ids_within_text(
    catalog: &LicenseCatalog,
    text: &str,
    targets: Option<&[&str]>,
) -> Vec<String> {
    CatalogScanner::new(catalog).matching_exception_ids_within_text(text, targets)
}

/// Strips the SPDX license list namespace from `uri`. Other URIs come back
/// unchanged.
pub fn license_uri_to_id(uri: &str) -> String {
    LICENSE_NAMESPACES
        .iter()
        .find_map(|namespace| uri.strip_prefix(namespace))
        .unwrap_or(uri)
        .to_string()
}
