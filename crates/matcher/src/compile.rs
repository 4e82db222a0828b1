//! Template compilation.
//!
//! A template is flattened into a node list. Every node links to the node that
//! follows it, so an optional region is a fork: its `body` chain and its `next`
//! link both continue with whatever follows the region.

use template::{parse, OptionalRule, TemplateError, TemplateSink, VariableRule};
use text::{
    is_single_token, strip_comments, tokenize_with, LineColumn, NormalizeConfig, Token,
};

#[derive(Debug, Clone)]
pub(crate) enum Element {
    /// Required tokens, matched one for one.
    Text(Vec<Token>),
    /// Fork: try `body`, then skip to `next`.
    Optional { body: Option<usize> },
    Variable {
        rule: VariableRule,
        /// Normalized original text when it is a single word. That word is
        /// accepted even where the pattern would reject it.
        literal: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) element: Element,
    pub(crate) next: Option<usize>,
    /// Number of enclosing optional regions.
    pub(crate) optional_depth: usize,
}

/// A template ready to be matched.
///
/// Compiling once and matching many texts avoids re-parsing and re-compiling
/// variable patterns.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    nodes: Vec<Node>,
    entry: Option<usize>,
    token_count: usize,
    normalize: NormalizeConfig,
}

impl CompiledTemplate {
    /// Strips comment markers from `template`, parses it and tokenizes its text
    /// with `cfg`.
    pub fn compile(template: &str, cfg: &NormalizeConfig) -> Result<Self, TemplateError> {
        let source = strip_comments(template);
        let mut sink = CompileSink::new(cfg);
        parse(&source, &mut sink)?;
        Ok(sink.into_template())
    }

    /// Number of fixed-text tokens, optional text included.
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// True if the template has neither text nor rules.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn normalize_config(&self) -> &NormalizeConfig {
        &self.normalize
    }

    pub(crate) fn entry(&self) -> Option<usize> {
        self.entry
    }

    pub(crate) fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// First token a match starting at `id` must begin with, if that is known
    /// without looking at the text.
    pub(crate) fn leading_token(&self, id: Option<usize>) -> Option<&str> {
        match &self.nodes.get(id?)?.element {
            Element::Text(tokens) => tokens.first().map(|t| t.text.as_str()),
            _ => None,
        }
    }
}

struct Frame {
    first: Option<usize>,
    /// Nodes whose `next` is the node pushed next.
    tail: Vec<usize>,
}

struct CompileSink<'c> {
    cfg: &'c NormalizeConfig,
    nodes: Vec<Node>,
    frames: Vec<Frame>,
    owners: Vec<usize>,
    token_count: usize,
}

impl<'c> CompileSink<'c> {
    fn new(cfg: &'c NormalizeConfig) -> Self {
        Self {
            cfg,
            nodes: Vec::new(),
            frames: vec![Frame {
                first: None,
                tail: Vec::new(),
            }],
            owners: Vec::new(),
            token_count: 0,
        }
    }

    fn push(&mut self, element: Element) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            element,
            next: None,
            optional_depth: self.owners.len(),
        });
        if let Some(frame) = self.frames.last_mut() {
            for &dangling in &frame.tail {
                self.nodes[dangling].next = Some(id);
            }
            frame.first.get_or_insert(id);
            frame.tail.clear();
            frame.tail.push(id);
        }
        id
    }

    fn into_template(self) -> CompiledTemplate {
        let entry = self.frames.first().and_then(|frame| frame.first);
        CompiledTemplate {
            nodes: self.nodes,
            entry,
            token_count: self.token_count,
            normalize: self.cfg.clone(),
        }
    }
}

impl TemplateSink for CompileSink<'_> {
    fn text(&mut self, text: &str, origin: LineColumn) -> Result<(), TemplateError> {
        let mut tokens = tokenize_with(text, self.cfg);
        if tokens.is_empty() {
            return Ok(());
        }
        for token in &mut tokens {
            if token.line == 1 {
                token.column += origin.column;
            }
            token.line += origin.line - 1;
        }
        self.token_count += tokens.len();
        self.push(Element::Text(tokens));
        Ok(())
    }

    fn begin_optional(&mut self, _rule: &OptionalRule) -> Result<(), TemplateError> {
        let id = self.push(Element::Optional { body: None });
        self.owners.push(id);
        self.frames.push(Frame {
            first: None,
            tail: Vec::new(),
        });
        Ok(())
    }

    fn end_optional(&mut self, rule: &OptionalRule) -> Result<(), TemplateError> {
        let (Some(owner), Some(inner)) = (self.owners.pop(), self.frames.pop()) else {
            return Err(TemplateError::UnexpectedEndOptional { line: rule.line });
        };
        if let Element::Optional { body } = &mut self.nodes[owner].element {
            *body = inner.first;
        }
        if let Some(outer) = self.frames.last_mut() {
            outer.tail.extend(inner.tail);
        }
        Ok(())
    }

    fn variable(&mut self, rule: &VariableRule) -> Result<(), TemplateError> {
        let literal = if is_single_token(rule.original()) {
            match tokenize_with(rule.original(), self.cfg).as_slice() {
                [word] => Some(word.text.clone()),
                _ => None,
            }
        } else {
            None
        };
        self.push(Element::Variable {
            rule: rule.clone(),
            literal,
        });
        Ok(())
    }
}
