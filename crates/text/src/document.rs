//! Prepared candidate text.
//!
//! [`TokenizedText`] bundles everything the matcher needs to walk a template
//! over a piece of text: the comment-stripped source, its tokens and the
//! space-joined normalized form with per-token byte offsets.
//!
//! # Examples
//!
//! ```rust
//! use text::{NormalizeConfig, TokenizedText};
//!
//! let doc = TokenizedText::new("// Copyright 2020 Acme", &NormalizeConfig::default());
//! assert_eq!(doc.len(), 3);
//! assert_eq!(doc.normalized(), "copyright 2020 acme");
//! assert_eq!(doc.normalized_span(1, 3), "2020 acme");
//! assert_eq!(doc.original_span(1, 3), "2020 Acme");
//! ```

use serde::{Deserialize, Serialize};

use crate::comments::strip_comments;
use crate::config::NormalizeConfig;
use crate::pipeline::tokenize_with;
use crate::token::Token;

/// Tokenized, comment-stripped text ready for matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenizedText {
    source: String,
    tokens: Vec<Token>,
    normalized: String,
    offsets: Vec<(usize, usize)>,
    char_starts: Vec<usize>,
}

impl TokenizedText {
    pub fn new(raw: &str, cfg: &NormalizeConfig) -> Self {
        let source = strip_comments(raw);
        let tokens = tokenize_with(&source, cfg);

        let mut normalized = String::with_capacity(source.len());
        let mut offsets = Vec::with_capacity(tokens.len());
        let mut char_starts = Vec::with_capacity(tokens.len() + 1);
        let mut chars = 0usize;
        for token in &tokens {
            if !normalized.is_empty() {
                normalized.push(' ');
                chars += 1;
            }
            let start = normalized.len();
            normalized.push_str(&token.text);
            offsets.push((start, normalized.len()));
            char_starts.push(chars);
            chars += token.text.chars().count();
        }
        char_starts.push(chars + 1);

        Self {
            source,
            tokens,
            normalized,
            offsets,
            char_starts,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The comment-stripped source. Byte offsets match the raw input.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All tokens joined by single spaces.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Normalized text of tokens `start..end` (half-open). Empty when the
    /// range is empty or out of bounds.
    pub fn normalized_span(&self, start: usize, end: usize) -> &str {
        if start >= end || end > self.offsets.len() {
            return "";
        }
        &self.normalized[self.offsets[start].0..self.offsets[end - 1].1]
    }

    /// Character count of [`normalized_span`](Self::normalized_span) without
    /// building the slice.
    pub fn normalized_char_len(&self, start: usize, end: usize) -> usize {
        if start >= end || end > self.tokens.len() {
            return 0;
        }
        // char_starts[end] is one past the separator that follows token end - 1.
        self.char_starts[end] - 1 - self.char_starts[start]
    }

    /// Source excerpt covering tokens `start..end` (half-open), comment
    /// markers blanked.
    pub fn original_span(&self, start: usize, end: usize) -> &str {
        if start >= end || end > self.tokens.len() {
            return "";
        }
        self.source
            .get(self.tokens[start].start..self.tokens[end - 1].end)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_are_half_open() {
        let doc = TokenizedText::new("one two three", &NormalizeConfig::default());
        assert_eq!(doc.normalized_span(0, 1), "one");
        assert_eq!(doc.normalized_span(1, 1), "");
        assert_eq!(doc.original_span(0, 3), "one two three");
        assert_eq!(doc.original_span(2, 9), "");
    }

    #[test]
    fn char_len_matches_span() {
        let doc = TokenizedText::new("Caf\u{00E9} au lait", &NormalizeConfig::default());
        for start in 0..=doc.len() {
            for end in start..=doc.len() {
                assert_eq!(
                    doc.normalized_char_len(start, end),
                    doc.normalized_span(start, end).chars().count()
                );
            }
        }
    }

    #[test]
    fn original_span_keeps_line_breaks() {
        let doc = TokenizedText::new(" * one\n * two", &NormalizeConfig::default());
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.original_span(0, 2), "one\n   two");
    }

    #[test]
    fn empty_text_has_no_tokens() {
        let doc = TokenizedText::new("   \n  ", &NormalizeConfig::default());
        assert!(doc.is_empty());
        assert_eq!(doc.normalized(), "");
    }
}
