use thiserror::Error;

/// Errors raised while parsing a license template.
///
/// Every variant carries the 1-based line of the offending rule so a catalog
/// maintainer can find it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("rule starting at line {line} is missing its closing '>>'")]
    UnterminatedRule { line: usize },
    #[error("unknown rule type '{rule}' at line {line}")]
    UnknownRule { rule: String, line: usize },
    #[error("malformed rule at line {line}: {detail}")]
    MalformedRule { line: usize, detail: String },
    #[error("variable rule at line {line} has no name")]
    MissingVariableName { line: usize },
    #[error("variable '{name}' at line {line} has an invalid match pattern '{pattern}': {message}")]
    InvalidRegex {
        name: String,
        pattern: String,
        line: usize,
        message: String,
    },
    #[error("<<endOptional>> at line {line} has no matching <<beginOptional>>")]
    UnexpectedEndOptional { line: usize },
    #[error("<<beginOptional>> at line {line} is never closed by <<endOptional>>")]
    UnterminatedOptional { line: usize },
}

impl TemplateError {
    /// Source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            TemplateError::UnterminatedRule { line }
            | TemplateError::UnknownRule { line, .. }
            | TemplateError::MalformedRule { line, .. }
            | TemplateError::MissingVariableName { line }
            | TemplateError::InvalidRegex { line, .. }
            | TemplateError::UnexpectedEndOptional { line }
            | TemplateError::UnterminatedOptional { line } => *line,
        }
    }
}
