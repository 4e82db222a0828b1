use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::comments::strip_comments;
use crate::config::NormalizeConfig;
use crate::equivalence::{canonical_spelling, split_compound};
use crate::token::Token;

/// Upper bound on re-normalization passes. Real inputs settle after one or two.
const MAX_PASSES: usize = 4;

/// Normalizes license text with the default configuration.
///
/// Comment markers are removed, the text is tokenized and the tokens are
/// joined with single spaces. The result is idempotent:
/// `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &NormalizeConfig::default())
}

/// Normalizes license text with an explicit configuration.
pub fn normalize_with(raw: &str, cfg: &NormalizeConfig) -> String {
    let mut current = render(raw, cfg);
    for _ in 0..MAX_PASSES {
        let next = render(&current, cfg);
        if next == current {
            return current;
        }
        current = next;
    }
    tracing::debug!(
        passes = MAX_PASSES,
        "normalization did not settle; returning last pass"
    );
    current
}

fn render(text: &str, cfg: &NormalizeConfig) -> String {
    let tokens = tokenize_with(&strip_comments(text), cfg);
    let mut out = String::with_capacity(text.len());
    for token in &tokens {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

/// Tokenizes text with the default configuration.
///
/// Comment markers are not removed here; run [`strip_comments`] first when the
/// text may be embedded in source comments.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with(text, &NormalizeConfig::default())
}

/// Tokenizes text, dropping skippable punctuation and folding equivalent words.
pub fn tokenize_with(text: &str, cfg: &NormalizeConfig) -> Vec<Token> {
    let kept: Vec<Token> = scan(text, cfg)
        .into_iter()
        .filter(|token| !is_skippable(&token.text))
        .collect();
    if cfg.fold_equivalent_words {
        fold_words(kept)
    } else {
        kept
    }
}

/// The token boundary shared by templates and candidate texts.
///
/// Whitespace separates tokens; the punctuation characters below separate
/// tokens and are tokens themselves.
pub fn is_boundary(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '.' | ','
                | '?'
                | '!'
                | '\''
                | '"'
                | '('
                | ')'
                | ';'
                | ':'
                | '/'
                | '['
                | ']'
                | '<'
                | '>'
                | '-'
                | '*'
                | '='
        )
}

/// Tokens that never take part in a comparison.
fn is_skippable(token: &str) -> bool {
    matches!(token, "-" | "," | "'" | "\"" | "*" | "=")
}

/// True if `text` sits on a single line and holds at most one token.
/// Skippable punctuation counts as a token here.
pub fn is_single_token(text: &str) -> bool {
    if text.contains('\n') || text.contains('\r') {
        return false;
    }
    scan(text, &NormalizeConfig::default()).len() <= 1
}

/// First normalized token of `text` after comment removal.
pub fn first_token(text: &str) -> Option<String> {
    tokenize(&strip_comments(text))
        .into_iter()
        .next()
        .map(|token| token.text)
}

/// Recovers the original excerpt covering tokens `start..=end`.
///
/// `tokens` must come from `full_text` (or from its comment-stripped form,
/// which has the same offsets). An out of range `end` reads to the end of the
/// text; `start > end` or an out of range `start` yields an empty string.
pub fn locate_original_text(full_text: &str, tokens: &[Token], start: usize, end: usize) -> String {
    if start > end {
        return String::new();
    }
    let Some(first) = tokens.get(start) else {
        return String::new();
    };
    let stop = tokens.get(end).map_or(full_text.len(), |token| token.end);
    full_text
        .get(first.start..stop)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Splits text into raw tokens, skippables included.
fn scan(text: &str, cfg: &NormalizeConfig) -> Vec<Token> {
    let mut state = ScanState::default();
    let mut folded = String::new();
    let mut line_offset = 0usize;

    for (line_idx, line) in text.split('\n').enumerate() {
        state.line = line_idx + 1;
        let mut column = 0usize;
        for (byte_idx, grapheme) in line.grapheme_indices(true) {
            let width = grapheme.chars().count();
            let span = Span {
                column,
                width,
                start: line_offset + byte_idx,
                end: line_offset + byte_idx + grapheme.len(),
            };
            folded.clear();
            fold_grapheme(grapheme, cfg, &mut folded);
            for ch in folded.chars() {
                dispatch_char(ch, span, &mut state);
            }
            column += width;
        }
        state.finish_word();
        line_offset += line.len() + 1;
    }

    state.tokens
}

/// Where a grapheme sits in the source text.
#[derive(Clone, Copy)]
struct Span {
    column: usize,
    width: usize,
    start: usize,
    end: usize,
}

#[derive(Default)]
struct ScanState {
    tokens: Vec<Token>,
    line: usize,
    word: String,
    word_start: Option<Span>,
    word_end: Option<Span>,
}

impl ScanState {
    fn push_word_char(&mut self, ch: char, span: Span) {
        if self.word_start.is_none() {
            self.word_start = Some(span);
        }
        self.word_end = Some(span);
        self.word.push(ch);
    }

    fn push_boundary(&mut self, ch: char, span: Span) {
        self.finish_word();
        self.tokens.push(Token {
            text: ch.to_string(),
            line: self.line,
            column: span.column,
            length: span.width,
            start: span.start,
            end: span.end,
        });
    }

    fn finish_word(&mut self) {
        let (Some(first), Some(last)) = (self.word_start.take(), self.word_end.take()) else {
            return;
        };
        if self.word.is_empty() {
            return;
        }
        self.tokens.push(Token {
            text: std::mem::take(&mut self.word),
            line: self.line,
            column: first.column,
            length: last.column + last.width - first.column,
            start: first.start,
            end: last.end,
        });
    }
}

fn dispatch_char(ch: char, span: Span, state: &mut ScanState) {
    if ch.is_whitespace() {
        state.finish_word();
    } else if is_boundary(ch) {
        state.push_boundary(ch, span);
    } else {
        state.push_word_char(ch, span);
    }
}

/// Case-folds one grapheme and maps quote and dash variants onto ASCII.
fn fold_grapheme(grapheme: &str, cfg: &NormalizeConfig, out: &mut String) {
    if grapheme.is_ascii() {
        for ch in grapheme.chars() {
            push_folded(ch.to_ascii_lowercase(), out);
        }
    } else if cfg.normalize_unicode {
        for ch in grapheme.nfkc() {
            push_folded(ch, out);
        }
    } else {
        for ch in grapheme.chars() {
            push_folded(ch, out);
        }
    }
}

fn push_folded(ch: char, out: &mut String) {
    match ch {
        '"' | '`' | '\u{00B4}' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}'
        | '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{00AB}' | '\u{00BB}'
        | '\u{2032}' | '\u{2033}' => out.push('\''),
        '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => {
            out.push('-')
        }
        '\u{00A9}' => out.push_str("(c)"),
        _ => out.extend(ch.to_lowercase()),
    }
}

/// Applies spelling equivalences and splits run-together compounds.
///
/// Only single tokens are rewritten, never pairs of neighbours, so a template
/// tokenized one text fragment at a time yields the same words as the text
/// rendered from it.
fn fold_words(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for mut token in tokens {
        if let Some(canonical) = canonical_spelling(&token.text) {
            token.text = canonical.to_string();
        }
        match split_compound(&token.text) {
            Some((first, second)) => {
                let (head, tail) = split_token(token, first, second);
                out.push(head);
                out.push(tail);
            }
            None => out.push(token),
        }
    }
    out
}

/// Both halves of a split compound. When the source spelling is as long as
/// the folded word the halves get their own spans; otherwise each half
/// points at the whole word.
fn split_token(token: Token, first: &str, second: &str) -> (Token, Token) {
    let exact = token.end - token.start == token.text.len()
        && token.length == token.text.chars().count();
    let mut head = Token {
        text: first.to_string(),
        ..token.clone()
    };
    let mut tail = Token {
        text: second.to_string(),
        ..token
    };
    if exact {
        let cut = first.len();
        head.end = head.start + cut;
        head.length = cut;
        tail.start += cut;
        tail.column += cut;
        tail.length -= cut;
    }
    (head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn punctuation_is_tokenized_and_skippables_dropped() {
        let tokens = tokenize("Hello, World (the \"Software\").");
        assert_eq!(
            texts(&tokens),
            vec!["hello", "world", "(", "the", "software", ")", "."]
        );
    }

    #[test]
    fn token_positions_point_into_original() {
        let input = "first line\n  Second, Line";
        let tokens = tokenize(input);
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].text, "second");
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].column, 2);
        assert_eq!(tokens[2].length, 6);
        assert_eq!(&input[tokens[2].start..tokens[2].end], "Second");
        assert_eq!(tokens[3].column, 10);
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let tokens = tokenize("\u{00E9}t\u{00E9} word");
        assert_eq!(tokens[0].text, "\u{00E9}t\u{00E9}");
        assert_eq!(tokens[1].column, 4);
    }

    #[test]
    fn combining_sequences_fold_to_composed_form() {
        let composed = normalize("Caf\u{00E9}");
        let decomposed = normalize("Cafe\u{0301}");
        assert_eq!(composed, decomposed);
    }

    #[test]
    fn quote_dash_and_copyright_variants_fold() {
        assert_eq!(
            normalize("\u{201C}AS IS\u{201D} \u{2014} Copyright \u{00A9} 2020"),
            normalize("\"AS IS\" - Copyright (c) 2020")
        );
    }

    #[test]
    fn equivalent_words_and_compounds_fold() {
        assert_eq!(normalize("sub-licence"), "sub license");
        assert_eq!(normalize("sublicence"), "sub license");
        assert_eq!(normalize("percent"), "per cent");
        assert_eq!(normalize("NON-INFRINGEMENT"), "non infringement");
        assert_eq!(normalize("https://example.org"), "http : / / example . org");
    }

    #[test]
    fn compound_spellings_share_tokens() {
        let expected = normalize("non exclusive");
        assert_eq!(normalize("nonexclusive"), expected);
        assert_eq!(normalize("Non-Exclusive"), expected);
        // Unlisted neighbours stay apart.
        assert_eq!(normalize("non and free"), "non and free");
        assert_eq!(normalize("sub 3"), "sub 3");
    }

    #[test]
    fn split_compound_positions_point_into_original() {
        let input = "a Noninfringement clause";
        let tokens = tokenize(input);
        assert_eq!(texts(&tokens), vec!["a", "non", "infringement", "clause"]);
        assert_eq!(&input[tokens[1].start..tokens[1].end], "Non");
        assert_eq!(&input[tokens[2].start..tokens[2].end], "infringement");
        assert_eq!(tokens[2].column, 5);
        assert_eq!(tokens[2].length, 12);
        assert_eq!(tokens[3].column, 18);
    }

    #[test]
    fn folding_can_be_disabled() {
        let cfg = NormalizeConfig {
            fold_equivalent_words: false,
            ..Default::default()
        };
        assert_eq!(normalize_with("licence", &cfg), "licence");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "  /* Copyright (c) 2020 The Authors.\n * All rights reserved. */",
            "Permission is hereby granted, free of charge, to any person",
            "// non-commercial sub licence -- see http://example.org",
            "\u{037E} looks like a semicolon",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample: {sample:?}");
        }
    }

    #[test]
    fn comment_wrapped_text_normalizes_like_plain_text() {
        let plain = "Permission is hereby granted\nfree of charge";
        let wrapped = "/*\n * Permission is hereby granted\n * free of charge\n */";
        assert_eq!(normalize(plain), normalize(wrapped));
    }

    #[test]
    fn single_token_detection() {
        assert!(is_single_token(" token "));
        assert!(is_single_token("'"));
        assert!(is_single_token(" '"));
        assert!(is_single_token("' "));
        assert!(!is_single_token("a and"));
        assert!(!is_single_token("a\nand"));
    }

    #[test]
    fn first_token_skips_leading_whitespace() {
        assert_eq!(
            first_token("   first,token that is needed\nnext").as_deref(),
            Some("first")
        );
        assert_eq!(first_token("   "), None);
    }

    #[test]
    fn locate_recovers_original_excerpt() {
        let full = "Copyright (C) 2020\nAcme  Corp.";
        let tokens = tokenize(full);
        // copyright ( c ) 2020 acme corp .
        assert_eq!(locate_original_text(full, &tokens, 4, 6), "2020\nAcme  Corp");
        assert_eq!(locate_original_text(full, &tokens, 5, 99), "Acme  Corp.");
        assert_eq!(locate_original_text(full, &tokens, 3, 2), "");
        assert_eq!(locate_original_text(full, &tokens, 99, 100), "");
    }
}
