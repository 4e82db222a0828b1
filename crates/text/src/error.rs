use thiserror::Error;

/// Errors raised by the text layer.
///
/// Normalization itself never fails; only configuration validation does.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
