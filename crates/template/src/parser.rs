//! Push parser for license templates.
//!
//! The parser walks the template once and reports what it finds to a
//! [`TemplateSink`]. Optional regions are parsed recursively, so a sink sees
//! `begin_optional` / `end_optional` calls that are always balanced.

use once_cell::sync::Lazy;
use regex::Regex;
use text::LineColumn;

use crate::error::TemplateError;
use crate::rule::{parse_rule, OptionalRule, Rule, VariableRule};

/// `<<` only opens a rule when a rule keyword follows. Any other `<<` is
/// ordinary license text.
static RULE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<<\s*(?i:var|beginOptional|endOptional)\b").expect("rule start pattern")
});

/// Receives template structure from [`parse`].
pub trait TemplateSink {
    /// Fixed text. `origin` is where the text starts in the template.
    fn text(&mut self, text: &str, origin: LineColumn) -> Result<(), TemplateError>;

    fn begin_optional(&mut self, rule: &OptionalRule) -> Result<(), TemplateError>;

    fn end_optional(&mut self, rule: &OptionalRule) -> Result<(), TemplateError>;

    fn variable(&mut self, rule: &VariableRule) -> Result<(), TemplateError>;

    /// Called once after the whole template was parsed successfully.
    fn finish(&mut self) -> Result<(), TemplateError> {
        Ok(())
    }
}

/// Parses `template`, pushing its structure into `sink`.
///
/// Fails on the first malformed rule; the sink may have received callbacks for
/// the text before it.
pub fn parse<S: TemplateSink + ?Sized>(template: &str, sink: &mut S) -> Result<(), TemplateError> {
    let mut parser = Parser {
        src: template,
        pos: 0,
        line: 1,
        line_start: 0,
    };
    parser.sequence(sink, None)?;
    sink.finish()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Parser<'a> {
    /// Parses until end of input, or until the `<<endOptional>>` closing `open`.
    fn sequence<S: TemplateSink + ?Sized>(
        &mut self,
        sink: &mut S,
        open: Option<&OptionalRule>,
    ) -> Result<(), TemplateError> {
        loop {
            let src = self.src;
            let rest = &src[self.pos..];
            let Some(found) = RULE_START.find(rest) else {
                self.emit_text(sink, rest.len())?;
                return match open {
                    Some(rule) => Err(TemplateError::UnterminatedOptional { line: rule.line }),
                    None => Ok(()),
                };
            };
            self.emit_text(sink, found.start())?;

            let line = self.line;
            let body = self.take_rule_body(line)?;
            match parse_rule(body, line)? {
                Rule::Variable(rule) => sink.variable(&rule)?,
                Rule::BeginOptional(rule) => {
                    sink.begin_optional(&rule)?;
                    self.sequence(sink, Some(&rule))?;
                }
                Rule::EndOptional => {
                    return match open {
                        Some(rule) => sink.end_optional(rule),
                        None => Err(TemplateError::UnexpectedEndOptional { line }),
                    };
                }
            }
        }
    }

    fn emit_text<S: TemplateSink + ?Sized>(
        &mut self,
        sink: &mut S,
        len: usize,
    ) -> Result<(), TemplateError> {
        if len == 0 {
            return Ok(());
        }
        let src = self.src;
        let text = &src[self.pos..self.pos + len];
        let origin = LineColumn::new(
            self.line,
            src[self.line_start..self.pos].chars().count(),
            text.chars().count(),
        );
        self.advance(len);
        sink.text(text, origin)
    }

    /// Consumes `<<body>>` and returns `body`. The cursor must sit on `<<`.
    fn take_rule_body(&mut self, line: usize) -> Result<&'a str, TemplateError> {
        let src = self.src;
        let rest = &src[self.pos + 2..];
        let mut in_quote = false;
        let mut escaped = false;

        for (idx, ch) in rest.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' if in_quote => escaped = true,
                '"' => in_quote = !in_quote,
                '>' if !in_quote && rest[idx..].starts_with(">>") => {
                    self.advance(2 + idx + 2);
                    return Ok(&rest[..idx]);
                }
                _ => {}
            }
        }
        Err(TemplateError::UnterminatedRule { line })
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.src[self.pos..self.pos + len];
        for (idx, byte) in consumed.bytes().enumerate() {
            if byte == b'\n' {
                self.line += 1;
                self.line_start = self.pos + idx + 1;
            }
        }
        self.pos += len;
    }
}
