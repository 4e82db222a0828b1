//! Configuration types for license text normalization.
//!
//! [`NormalizeConfig`] controls how raw license text is folded before it is
//! tokenized. The same configuration must be used for a template and for the
//! candidate text it is compared against, otherwise tokens that denote the same
//! word may differ.
//!
//! # Versioning
//!
//! The `version` field tracks changes to folding behavior. Version 0 is
//! reserved and rejected by [`NormalizeConfig::validate`].
//!
//! # Examples
//!
//! ```rust
//! use text::NormalizeConfig;
//!
//! let config = NormalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.normalize_unicode);
//! assert!(config.fold_equivalent_words);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TextError;

/// Configuration for the normalizer and tokenizer.
///
/// # Serialization
///
/// ```json
/// {
///   "version": 1,
///   "normalize_unicode": true,
///   "fold_equivalent_words": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Version of the folding rules. Must be >= 1.
    pub version: u32,

    /// If true, apply Unicode NFKC compatibility folding to every grapheme
    /// before lowercasing.
    ///
    /// ```text
    /// "ﬁle" (U+FB01 ligature) → "file"
    /// "Cafe" + U+0301          → "café"
    /// ```
    pub normalize_unicode: bool,

    /// If true, fold spelling variants onto one canonical word
    /// (`licence` → `license`, `behaviour` → `behavior`, `https` → `http`)
    /// and split listed compounds (`percent` → `per cent`,
    /// `noninfringement` → `non infringement`).
    pub fold_equivalent_words: bool,
}

impl NormalizeConfig {
    /// Checks the configuration for values the normalizer cannot honor.
    pub fn validate(&self) -> Result<(), TextError> {
        if self.version == 0 {
            return Err(TextError::InvalidConfig(
                "normalize config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            fold_equivalent_words: true,
        }
    }
}
