//! Sinks that render a template back to text.
//!
//! [`FilterSink`] extracts the text that every matching license must contain.
//! [`PlainTextSink`] renders one concrete license text from a template, using
//! each variable's original text and keeping all optional text.

use text::LineColumn;

use crate::error::TemplateError;
use crate::parser::{parse, TemplateSink};
use crate::rule::{OptionalRule, VariableRule};

/// What [`FilterSink`] does with variable regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarTextHandling {
    /// Keep the variable's original text.
    Original,
    /// Drop the variable and start a new segment.
    Omit,
    /// Emit the pattern wrapped as `~~~pattern~~~`.
    Regex,
}

/// What [`FilterSink`] does with optional regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalTextHandling {
    /// Keep the optional text as if it were required.
    Original,
    /// Drop the region and start a new segment.
    Omit,
    /// Replace the region with `~~~(?s:.*)~~~`.
    Regex,
}

/// Marker emitted for an optional region under [`OptionalTextHandling::Regex`].
const OPTIONAL_REGEX: &str = "~~~(?s:.*)~~~";

/// Collects non-optional text in segments.
///
/// A segment ends wherever an omitted region interrupts the text. Segments are
/// trimmed and blank ones are dropped.
#[derive(Debug)]
pub struct FilterSink {
    var_handling: VarTextHandling,
    optional_handling: OptionalTextHandling,
    depth: usize,
    current: String,
    segments: Vec<String>,
}

impl FilterSink {
    pub fn new(var_handling: VarTextHandling, optional_handling: OptionalTextHandling) -> Self {
        Self {
            var_handling,
            optional_handling,
            depth: 0,
            current: String::new(),
            segments: Vec::new(),
        }
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }

    fn in_dropped_optional(&self) -> bool {
        self.depth > 0 && self.optional_handling != OptionalTextHandling::Original
    }

    fn split(&mut self) {
        let segment = std::mem::take(&mut self.current);
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            self.segments.push(trimmed.to_string());
        }
    }
}

impl TemplateSink for FilterSink {
    fn text(&mut self, text: &str, _origin: LineColumn) -> Result<(), TemplateError> {
        if !self.in_dropped_optional() {
            self.current.push_str(text);
        }
        Ok(())
    }

    fn begin_optional(&mut self, _rule: &OptionalRule) -> Result<(), TemplateError> {
        self.depth += 1;
        if self.depth == 1 {
            match self.optional_handling {
                OptionalTextHandling::Original => {}
                OptionalTextHandling::Omit => self.split(),
                OptionalTextHandling::Regex => self.current.push_str(OPTIONAL_REGEX),
            }
        }
        Ok(())
    }

    fn end_optional(&mut self, _rule: &OptionalRule) -> Result<(), TemplateError> {
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn variable(&mut self, rule: &VariableRule) -> Result<(), TemplateError> {
        if self.in_dropped_optional() {
            return Ok(());
        }
        match self.var_handling {
            VarTextHandling::Original => self.current.push_str(rule.original()),
            VarTextHandling::Omit => self.split(),
            VarTextHandling::Regex => {
                self.current.push_str("~~~");
                self.current.push_str(rule.pattern());
                self.current.push_str("~~~");
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), TemplateError> {
        self.split();
        Ok(())
    }
}

/// Text segments a matching license must contain.
pub fn non_optional_text(
    template: &str,
    var_handling: VarTextHandling,
    optional_handling: OptionalTextHandling,
) -> Result<Vec<String>, TemplateError> {
    let mut sink = FilterSink::new(var_handling, optional_handling);
    parse(template, &mut sink)?;
    Ok(sink.into_segments())
}

/// Renders a template as plain license text.
#[derive(Debug, Default)]
pub struct PlainTextSink {
    out: String,
}

impl PlainTextSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_text(self) -> String {
        self.out
    }
}

impl TemplateSink for PlainTextSink {
    fn text(&mut self, text: &str, _origin: LineColumn) -> Result<(), TemplateError> {
        self.out.push_str(text);
        Ok(())
    }

    fn begin_optional(&mut self, _rule: &OptionalRule) -> Result<(), TemplateError> {
        Ok(())
    }

    fn end_optional(&mut self, _rule: &OptionalRule) -> Result<(), TemplateError> {
        Ok(())
    }

    fn variable(&mut self, rule: &VariableRule) -> Result<(), TemplateError> {
        self.out.push_str(rule.original());
        Ok(())
    }
}

/// The license text a template was written from: variables replaced by their
/// original text, optional text kept.
pub fn template_to_text(template: &str) -> Result<String, TemplateError> {
    let mut sink = PlainTextSink::new();
    parse(template, &mut sink)?;
    Ok(sink.into_text())
}
