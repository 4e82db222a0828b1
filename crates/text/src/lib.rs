//! License text normalization and tokenization.
//!
//! Everything that compares license text goes through this crate, so a
//! template and the text it is checked against are always folded the same way.
//!
//! ## What we do
//!
//! - Comment marker removal (`//`, `/* */`, `#`, `REM `, `<!-- -->`, ...) that
//!   keeps every byte offset and column intact
//! - NFKC folding, lowercasing, quote and dash unification, `©` → `(c)`
//! - Equivalent spellings (`licence` → `license`) and listed compounds in
//!   one canonical spacing (`sublicense`, `sub-license` → `sub license`)
//! - Tokenization where each token remembers its line, column and byte span
//!   in the original text
//!
//! ## Pure function guarantee
//!
//! No I/O and no locale dependence. Same text and config give the same tokens
//! on any machine.
//!
//! ## Invariants worth knowing
//!
//! - [`normalize`] is idempotent
//! - [`strip_comments`] never changes the byte length of a line
//! - Skippable punctuation (`-`, `,`, quotes, `*`, `=`) never reaches the
//!   token stream, so list separators and bullets do not register as
//!   differences

mod comments;
mod config;
mod document;
mod equivalence;
mod error;
mod pipeline;
mod token;
mod whitespace;

pub use crate::comments::strip_comments;
pub use crate::config::NormalizeConfig;
pub use crate::document::TokenizedText;
pub use crate::error::TextError;
pub use crate::pipeline::{
    first_token, is_boundary, is_single_token, locate_original_text, normalize, normalize_with,
    tokenize, tokenize_with,
};
pub use crate::token::{LineColumn, Token};
pub use crate::whitespace::collapse_whitespace;
