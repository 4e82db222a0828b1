//! YAML configuration for license comparison.
//!
//! One file configures every layer: text folding, template matching and
//! catalog scans. Every section and field is optional.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "release audit"
//!
//! text:
//!   version: 1
//!   normalize_unicode: true
//!   fold_equivalent_words: true
//!
//! matcher:
//!   version: 1
//!   context_tokens: 6
//!
//! scan:
//!   parallel: true
//!   include_deprecated: false
//! ```

use std::fs;
use std::path::Path;

use matcher::{MatchConfig, ScanConfig};
use serde::{Deserialize, Serialize};
use text::NormalizeConfig;
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LicenseCompareConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub text: TextYamlConfig,

    #[serde(default)]
    pub matcher: MatchYamlConfig,

    #[serde(default)]
    pub scan: ScanYamlConfig,
}

impl LicenseCompareConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: LicenseCompareConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.text.validate()?;
        self.matcher.validate()?;
        Ok(())
    }

    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            version: self.text.version,
            normalize_unicode: self.text.normalize_unicode,
            fold_equivalent_words: self.text.fold_equivalent_words,
        }
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            version: self.matcher.version,
            context_tokens: self.matcher.context_tokens,
            normalize: self.normalize_config(),
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            parallel: self.scan.parallel,
            include_deprecated: self.scan.include_deprecated,
        }
    }
}

impl Default for LicenseCompareConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            text: TextYamlConfig::default(),
            matcher: MatchYamlConfig::default(),
            scan: ScanYamlConfig::default(),
        }
    }
}

/// Text folding YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub normalize_unicode: bool,

    #[serde(default = "true_value")]
    pub fold_equivalent_words: bool,
}

impl TextYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "text.version must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TextYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            fold_equivalent_words: true,
        }
    }
}

/// Matcher YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Tokens of context quoted around a reported difference.
    #[serde(default = "default_context_tokens")]
    pub context_tokens: usize,
}

impl MatchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "matcher.version must be >= 1".to_string(),
            ));
        }
        if self.context_tokens == 0 {
            return Err(ConfigLoadError::Validation(
                "matcher.context_tokens must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            context_tokens: 6,
        }
    }
}

/// Catalog scan YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanYamlConfig {
    #[serde(default = "true_value")]
    pub parallel: bool,

    #[serde(default = "true_value")]
    pub include_deprecated: bool,
}

impl Default for ScanYamlConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            include_deprecated: true,
        }
    }
}

// Helper functions for serde defaults
fn default_version() -> u32 {
    1
}
fn true_value() -> bool {
    true
}
fn default_context_tokens() -> usize {
    6
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "audit"
text:
  version: 1
  fold_equivalent_words: false
scan:
  include_deprecated: false
"#;

        let config = LicenseCompareConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("audit".to_string()));
        assert!(!config.text.fold_equivalent_words);
        assert!(config.text.normalize_unicode);
        assert!(!config.scan.include_deprecated);
        assert!(config.scan.parallel);
        assert_eq!(config.matcher.context_tokens, 6);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
matcher:
  context_tokens: 3
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = LicenseCompareConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.match_config().context_tokens, 3);
    }

    #[test]
    fn test_missing_file() {
        let result = LicenseCompareConfig::from_file("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
    }

    #[test]
    fn test_default_config_converts() {
        let config = LicenseCompareConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.match_config(), MatchConfig::default());
        assert_eq!(config.scan_config(), ScanConfig::default());
        assert_eq!(config.normalize_config(), NormalizeConfig::default());
    }

    #[test]
    fn test_unsupported_version() {
        let result = LicenseCompareConfig::from_yaml("version: \"2.0\"\n");
        match result {
            Err(ConfigLoadError::UnsupportedVersion(v)) => assert_eq!(v, "2.0"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_matcher_validation() {
        let yaml = r#"
version: "1.0"
matcher:
  context_tokens: 0
"#;

        let result = LicenseCompareConfig::from_yaml(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("context_tokens"));
    }

    #[test]
    fn test_text_validation() {
        let yaml = r#"
version: "1.0"
text:
  version: 0
"#;

        let result = LicenseCompareConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::Validation(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = LicenseCompareConfig::from_yaml("version: [unclosed");
        assert!(matches!(result, Err(ConfigLoadError::YamlParse(_))));
    }
}
