use serde::{Deserialize, Serialize};

/// Position of a token in the original, pre-normalization text.
///
/// `line` is 1-based, `column` is a 0-based character offset within the line
/// and `length` is the number of original characters covered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl LineColumn {
    pub fn new(line: usize, column: usize, length: usize) -> Self {
        Self {
            line,
            column,
            length,
        }
    }
}

/// A normalized token together with where it came from.
///
/// `start`/`end` are UTF-8 byte offsets into the text that was tokenized.
/// Comment stripping keeps byte offsets intact, so they are also offsets into
/// the caller's raw text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// Normalized token text.
    pub text: String,
    /// 1-based line number.
    pub line: usize,
    /// 0-based character column.
    pub column: usize,
    /// Number of original characters covered.
    pub length: usize,
    /// Byte offset (inclusive) in the tokenized text.
    pub start: usize,
    /// Byte offset (exclusive) in the tokenized text.
    pub end: usize,
}

impl Token {
    pub fn location(&self) -> LineColumn {
        LineColumn::new(self.line, self.column, self.length)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}
