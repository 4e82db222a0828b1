//! Comment marker removal.
//!
//! License headers are usually embedded in source comments, so a license found
//! in a file looks like:
//!
//! ```text
//! /*
//!  * Permission is hereby granted, free of charge, ...
//!  */
//! ```
//!
//! [`strip_comments`] blanks the comment markers at the start and end of every
//! line with spaces. Markers are ASCII, so the output has the same byte length,
//! the same character columns and the same line breaks as the input. Tokens
//! taken from the stripped text therefore still point into the caller's
//! original text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Markers that open a comment line: C/C++/Java/JS, shell/Python/Ruby, SQL and
/// Haskell, Lisp/assembler, HTML/XML, Pascal/OCaml, Visual Basic, DOS batch
/// and groff.
const LEADING_MARKERS: &str = r#"//|/\*|\*|#|' |REM |<!--|--|;|\(\*|\{-|\.\\""#;

static LEADING_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\s*({LEADING_MARKERS})")).expect("leading comment pattern")
});

static TRAILING_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(\*/|-->|-\}|\*\))|\s(\*))\s*$").expect("trailing comment pattern")
});

static OPTIONAL_THEN_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*<<beginOptional[^>]*>>\s*({LEADING_MARKERS})"
    ))
    .expect("optional comment pattern")
});

/// Blanks comment markers at the start and end of every line.
///
/// Line terminators (`\n` and `\r\n`) are kept as they are. An optional-region
/// begin marker (`<<beginOptional>>`) survives even when the line is comment
/// prefixed; a comment marker right after it is blanked instead.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in text.split_inclusive('\n') {
        let (body, terminator) = split_terminator(segment);
        out.push_str(&strip_line(body));
        out.push_str(terminator);
    }
    out
}

fn split_terminator(segment: &str) -> (&str, &str) {
    if let Some(body) = segment.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = segment.strip_suffix('\n') {
        (body, "\n")
    } else {
        (segment, "")
    }
}

fn strip_line(body: &str) -> String {
    let mut line = body.to_string();
    while blank_first_group(&TRAILING_COMMENT, &mut line) {}
    while blank_first_group(&LEADING_COMMENT, &mut line) {}
    while blank_first_group(&OPTIONAL_THEN_COMMENT, &mut line) {}
    line
}

/// Replaces the first participating capture group of `pattern` with spaces.
/// Returns false when nothing was blanked.
fn blank_first_group(pattern: &Regex, line: &mut String) -> bool {
    let Some(caps) = pattern.captures(line) else {
        return false;
    };
    let Some(group) = caps.iter().skip(1).flatten().next() else {
        return false;
    };
    let range = group.range();
    if range.is_empty() {
        return false;
    }
    let blank = " ".repeat(range.len());
    line.replace_range(range, &blank);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_comment_markers_are_blanked() {
        let input = "/*\n * Permission is granted\n */";
        let out = strip_comments(input);
        assert_eq!(out, "  \n   Permission is granted\n   ");
        assert_eq!(out.len(), input.len());
    }

    #[test]
    fn line_comment_styles() {
        assert_eq!(strip_comments("// hello").trim(), "hello");
        assert_eq!(strip_comments("# hello").trim(), "hello");
        assert_eq!(strip_comments("-- hello").trim(), "hello");
        assert_eq!(strip_comments("  REM hello").trim(), "hello");
        assert_eq!(strip_comments("' hello").trim(), "hello");
        assert_eq!(strip_comments(".\\\" hello").trim(), "hello");
        assert_eq!(strip_comments("<!-- hello -->").trim(), "hello");
        assert_eq!(strip_comments("(* hello *)").trim(), "hello");
        assert_eq!(strip_comments("{- hello -}").trim(), "hello");
    }

    #[test]
    fn stacked_markers_are_all_removed() {
        assert_eq!(strip_comments("// # ; hello").trim(), "hello");
    }

    #[test]
    fn begin_optional_survives_comment_prefix() {
        let out = strip_comments("// <<beginOptional>> # optional text");
        assert_eq!(out.trim(), "<<beginOptional>>   optional text");
    }

    #[test]
    fn crlf_terminators_are_kept() {
        let out = strip_comments("# one\r\n# two\r\n");
        assert_eq!(out, "  one\r\n  two\r\n");
    }

    #[test]
    fn inner_markers_are_untouched() {
        let line = "see http://example.org/licenses for details";
        assert_eq!(strip_comments(line), line);
    }
}
