/// Collapses whitespace runs (line breaks included) to single spaces and
/// trims both ends.
///
/// Variable patterns are written against running text, so multi-line excerpts
/// are flattened with this before a pattern sees them.
///
/// ```rust
/// use text::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Copyright\n   2020\tAcme "), "Copyright 2020 Acme");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(segment);
    }
    collapsed
}
