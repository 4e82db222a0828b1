//! Rule bodies: the text between `<<` and `>>`.
//!
//! ```text
//! <<var;name="copyright";original="Copyright (c) <year>";match=".{0,5000}">>
//! <<beginOptional;name="preamble">>
//! <<endOptional>>
//! ```
//!
//! Fields are `key=value` pairs separated by `;`. Values are usually double
//! quoted; inside quotes `\"` is a literal quote and `;` or `>>` do not end the
//! field. Unknown keys are ignored.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::error::TemplateError;

/// Compiled size budget for variable patterns. Expanded repetitions such as
/// `(?s:.){0,5000}` are far larger than the default allows.
const REGEX_SIZE_LIMIT: usize = 1 << 27;

/// Pattern used when a variable has no `match` field.
const ANY_TEXT: &str = "(?s:.*)";

/// A pattern of the form `<prefix>.{min,max}`.
static REPETITION_SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)(?P<prefix>.*)\.\{(?P<min>\d+),(?P<max>\d+)\}$")
        .expect("repetition shorthand pattern")
});

/// Character-count bounds on what a variable may capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthLimit {
    pub min: usize,
    pub max: Option<usize>,
}

impl LengthLimit {
    pub fn allows(&self, chars: usize) -> bool {
        chars >= self.min && self.max.is_none_or(|max| chars <= max)
    }
}

/// `<<beginOptional>>`, with the optional `name` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalRule {
    pub name: Option<String>,
    pub line: usize,
}

/// `<<var;...>>` with its pattern compiled.
#[derive(Debug, Clone)]
pub struct VariableRule {
    name: String,
    original: String,
    example: Option<String>,
    pattern: String,
    regex: Regex,
    length_limit: Option<LengthLimit>,
    line: usize,
}

impl VariableRule {
    /// Builds a variable rule. A missing `match_pattern` accepts any text,
    /// including none.
    pub fn new(
        name: impl Into<String>,
        original: impl Into<String>,
        match_pattern: Option<&str>,
        line: usize,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TemplateError::MissingVariableName { line });
        }
        let (pattern, length_limit) = match match_pattern {
            None => (
                ANY_TEXT.to_string(),
                Some(LengthLimit { min: 0, max: None }),
            ),
            Some(raw) => expand_repetition(raw),
        };
        let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(true)
            .size_limit(REGEX_SIZE_LIMIT)
            .dfa_size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map_err(|err| TemplateError::InvalidRegex {
                name: name.clone(),
                pattern: pattern.clone(),
                line,
                message: err.to_string(),
            })?;

        Ok(Self {
            name,
            original: original.into(),
            example: None,
            pattern,
            regex,
            length_limit,
            line,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text of the variable in the original license.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// The pattern after repetition expansion, unanchored.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Set when the whole pattern is a bounded repetition over any character
    /// (or absent). The pattern then accepts exactly the texts whose character
    /// count is inside the limit, and a matcher can skip the regex.
    pub fn length_limit(&self) -> Option<LengthLimit> {
        self.length_limit
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// True if the whole of `text` matches the pattern (case-insensitive).
    pub fn accepts(&self, text: &str) -> bool {
        match self.length_limit {
            Some(limit) => limit.allows(text.chars().count()),
            None => self.regex.is_match(text),
        }
    }

    fn with_example(mut self, example: Option<String>) -> Self {
        self.example = example;
        self
    }
}

/// Expands a trailing `.{min,max}` into a repetition over any character.
///
/// Returns the expanded pattern and, when the shorthand is the whole pattern,
/// its bounds as a length limit.
fn expand_repetition(raw: &str) -> (String, Option<LengthLimit>) {
    let Some(caps) = REPETITION_SHORTHAND.captures(raw) else {
        return (raw.to_string(), None);
    };
    let prefix = caps.name("prefix").map_or("", |m| m.as_str());
    if ends_with_escape(prefix) {
        return (raw.to_string(), None);
    }
    let (Some(min), Some(max)) = (
        caps.name("min").and_then(|m| m.as_str().parse::<usize>().ok()),
        caps.name("max").and_then(|m| m.as_str().parse::<usize>().ok()),
    ) else {
        return (raw.to_string(), None);
    };
    let expanded = format!("{prefix}(?s:.){{{min},{max}}}");
    let limit = prefix.is_empty().then_some(LengthLimit {
        min,
        max: Some(max),
    });
    (expanded, limit)
}

/// True if the last character of `prefix` escapes the `.` that follows it.
fn ends_with_escape(prefix: &str) -> bool {
    prefix.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// A parsed rule body.
#[derive(Debug, Clone)]
pub(crate) enum Rule {
    Variable(VariableRule),
    BeginOptional(OptionalRule),
    EndOptional,
}

pub(crate) fn parse_rule(body: &str, line: usize) -> Result<Rule, TemplateError> {
    let mut fields = split_fields(body, line)?.into_iter();
    let kind = fields.next().unwrap_or_default();
    let kind = kind.trim();

    let mut attrs: Vec<(String, String)> = Vec::new();
    for field in fields {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        let Some((key, value)) = field.split_once('=') else {
            return Err(TemplateError::MalformedRule {
                line,
                detail: format!("field '{field}' has no '='"),
            });
        };
        attrs.push((key.trim().to_ascii_lowercase(), unquote(value.trim(), line)?));
    }
    let attr = |key: &str| {
        attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if kind.eq_ignore_ascii_case("var") {
        let name = attr("name").ok_or(TemplateError::MissingVariableName { line })?;
        let original = attr("original").unwrap_or_default();
        let pattern = attr("match");
        let rule = VariableRule::new(name, original, pattern.as_deref(), line)?
            .with_example(attr("example"));
        Ok(Rule::Variable(rule))
    } else if kind.eq_ignore_ascii_case("beginOptional") {
        Ok(Rule::BeginOptional(OptionalRule {
            name: attr("name"),
            line,
        }))
    } else if kind.eq_ignore_ascii_case("endOptional") {
        Ok(Rule::EndOptional)
    } else {
        Err(TemplateError::UnknownRule {
            rule: kind.to_string(),
            line,
        })
    }
}

/// Splits on `;` outside double quotes.
fn split_fields(body: &str, line: usize) -> Result<Vec<String>, TemplateError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut escaped = false;

    for ch in body.chars() {
        if escaped {
            escaped = false;
            current.push(ch);
            continue;
        }
        match ch {
            '\\' if in_quote => {
                escaped = true;
                current.push(ch);
            }
            '"' => {
                in_quote = !in_quote;
                current.push(ch);
            }
            ';' if !in_quote => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if in_quote {
        return Err(TemplateError::MalformedRule {
            line,
            detail: "unterminated quoted value".into(),
        });
    }
    fields.push(current);
    Ok(fields)
}

/// Strips surrounding quotes and resolves `\"`. Other backslashes are kept so
/// regex escapes survive.
fn unquote(value: &str, line: usize) -> Result<String, TemplateError> {
    let Some(inner) = value.strip_prefix('"') else {
        return Ok(value.to_string());
    };
    let Some(inner) = inner.strip_suffix('"') else {
        return Err(TemplateError::MalformedRule {
            line,
            detail: format!("value {value} is missing its closing quote"),
        });
    };
    Ok(inner.replace("\\\"", "\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(body: &str) -> VariableRule {
        match parse_rule(body, 1).expect("rule parses") {
            Rule::Variable(rule) => rule,
            other => panic!("expected variable, got {other:?}"),
        }
    }

    #[test]
    fn fields_in_any_order() {
        let rule = variable(r#"var;match="[0-9]{4}";original="2020";name="year""#);
        assert_eq!(rule.name(), "year");
        assert_eq!(rule.original(), "2020");
        assert_eq!(rule.pattern(), "[0-9]{4}");
        assert!(rule.accepts("1999"));
        assert!(!rule.accepts("199"));
        assert!(!rule.accepts("nineteen"));
    }

    #[test]
    fn quoted_values_may_hold_separators_and_escapes() {
        let rule = variable(r#"var;name="q";original="a;b>>c \"quoted\"";match="a;b.*""#);
        assert_eq!(rule.original(), "a;b>>c \"quoted\"");
        assert!(rule.accepts("a;b anything"));
    }

    #[test]
    fn missing_match_accepts_anything() {
        let rule = variable(r#"var;name="free""#);
        assert!(rule.accepts(""));
        assert!(rule.accepts("any text\nat all"));
        assert_eq!(rule.length_limit(), Some(LengthLimit { min: 0, max: None }));
    }

    #[test]
    fn repetition_shorthand_is_expanded() {
        let rule = variable(r#"var;name="c";original="x";match=".{0,5}""#);
        assert_eq!(rule.pattern(), "(?s:.){0,5}");
        assert_eq!(
            rule.length_limit(),
            Some(LengthLimit {
                min: 0,
                max: Some(5)
            })
        );
        assert!(rule.accepts("12345"));
        assert!(!rule.accepts("123456"));
    }

    #[test]
    fn repetition_shorthand_after_prefix() {
        let rule = variable(r#"var;name="c";original="x";match="Copyright.{0,20}""#);
        assert_eq!(rule.pattern(), "Copyright(?s:.){0,20}");
        assert_eq!(rule.length_limit(), None);
        assert!(rule.accepts("copyright 2020 acme"));
        assert!(!rule.accepts("copy"));
    }

    #[test]
    fn escaped_dot_is_not_shorthand() {
        let (expanded, limit) = expand_repetition(r"a\.{1,3}");
        assert_eq!(expanded, r"a\.{1,3}");
        assert_eq!(limit, None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let rule = variable(r#"var;name="t";original="The";match="The""#);
        assert!(rule.accepts("the"));
    }

    #[test]
    fn begin_optional_may_carry_a_name() {
        match parse_rule(r#"beginOptional;name="preamble""#, 3).expect("parses") {
            Rule::BeginOptional(rule) => {
                assert_eq!(rule.name.as_deref(), Some("preamble"));
                assert_eq!(rule.line, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn errors_name_the_line() {
        assert_eq!(
            parse_rule(r#"var;original="x""#, 7).unwrap_err(),
            TemplateError::MissingVariableName { line: 7 }
        );
        assert!(matches!(
            parse_rule("bogus", 2),
            Err(TemplateError::UnknownRule { line: 2, .. })
        ));
        assert!(matches!(
            parse_rule(r#"var;name="x";match="(""#, 4),
            Err(TemplateError::InvalidRegex { line: 4, .. })
        ));
        assert!(matches!(
            parse_rule(r#"var;name="x"#, 5),
            Err(TemplateError::MalformedRule { line: 5, .. })
        ));
    }
}
