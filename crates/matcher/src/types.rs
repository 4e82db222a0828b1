use serde::{Deserialize, Serialize};
use template::TemplateError;
use text::{LineColumn, NormalizeConfig};
use thiserror::Error;

/// Configuration for comparing a template against text.
///
/// `MatchConfig` is cheap to clone and serde-friendly so it can be embedded in
/// higher-level configs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    /// Configuration schema version. Must be >= 1.
    #[serde(default = "MatchConfig::default_version")]
    pub version: u32,
    /// Number of tokens quoted on each side of a reported difference.
    #[serde(default = "MatchConfig::default_context_tokens")]
    pub context_tokens: usize,
    /// Folding rules applied to templates and candidate text alike.
    #[serde(default)]
    pub normalize: NormalizeConfig,
}

impl MatchConfig {
    pub(crate) fn default_version() -> u32 {
        1
    }

    pub(crate) fn default_context_tokens() -> usize {
        6
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.version == 0 {
            return Err(MatchError::InvalidConfig(
                "match config version must be >= 1".into(),
            ));
        }
        if self.context_tokens == 0 {
            return Err(MatchError::InvalidConfig(
                "context_tokens must be greater than zero".into(),
            ));
        }
        self.normalize
            .validate()
            .map_err(|err| MatchError::InvalidConfig(err.to_string()))
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            context_tokens: Self::default_context_tokens(),
            normalize: NormalizeConfig::default(),
        }
    }
}

/// Configuration for catalog scans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    /// Check catalog entries in parallel when the `parallel` feature is on.
    /// Results are the same either way.
    #[serde(default = "ScanConfig::default_parallel")]
    pub parallel: bool,
    /// Report deprecated identifiers too.
    #[serde(default = "ScanConfig::default_include_deprecated")]
    pub include_deprecated: bool,
}

impl ScanConfig {
    pub(crate) fn default_parallel() -> bool {
        true
    }

    pub(crate) fn default_include_deprecated() -> bool {
        true
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parallel: Self::default_parallel(),
            include_deprecated: Self::default_include_deprecated(),
        }
    }
}

/// Outcome of comparing a template against text.
///
/// `matching_non_optional_regions` is only set when no difference was found.
/// It lists half-open candidate token ranges covered by required template
/// text, in order and with adjacent ranges merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifferenceDescription {
    pub difference_found: bool,
    pub message: String,
    pub differences: Vec<LineColumn>,
    pub matching_non_optional_regions: Option<Vec<(usize, usize)>>,
}

impl DifferenceDescription {
    pub fn no_difference(regions: Vec<(usize, usize)>) -> Self {
        Self {
            difference_found: false,
            message: String::new(),
            differences: Vec::new(),
            matching_non_optional_regions: Some(regions),
        }
    }

    pub fn difference(message: impl Into<String>, location: Option<LineColumn>) -> Self {
        Self {
            difference_found: true,
            message: message.into(),
            differences: location.into_iter().collect(),
            matching_non_optional_regions: None,
        }
    }

    pub fn is_difference_found(&self) -> bool {
        self.difference_found
    }
}

/// Errors produced by the matching layer.
///
/// A text that does not match is not an error; it yields a
/// [`DifferenceDescription`] with `difference_found` set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Invalid configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The template could not be parsed.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}
