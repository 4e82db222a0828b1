//! License template grammar.
//!
//! A template is license text with three kinds of rules embedded in it:
//!
//! ```text
//! <<beginOptional>> text that may be absent <<endOptional>>
//! <<var;name="copyright";original="Copyright (c) 2020";match=".{0,5000}">>
//! ```
//!
//! [`parse`] walks a template and pushes its structure into a
//! [`TemplateSink`]. The crate ships three sinks: [`TreeBuilder`] for a node
//! tree, [`FilterSink`] for the text every match must contain and
//! [`PlainTextSink`] for a representative license text. The matcher crate adds
//! a compiling sink of its own.
//!
//! ## Invariants worth knowing
//!
//! - Optional regions nest and must balance; errors name the 1-based line
//! - A variable without `match` accepts any text, including none
//! - A `match` ending in `.{min,max}` is expanded to `(?s:.){min,max}`
//! - Patterns are anchored at both ends and case-insensitive

mod error;
mod filter;
mod parser;
mod rule;
mod tree;

pub use crate::error::TemplateError;
pub use crate::filter::{
    non_optional_text, template_to_text, FilterSink, OptionalTextHandling, PlainTextSink,
    VarTextHandling,
};
pub use crate::parser::{parse, TemplateSink};
pub use crate::rule::{LengthLimit, OptionalRule, VariableRule};
pub use crate::tree::{parse_tree, TemplateNode, TreeBuilder};
