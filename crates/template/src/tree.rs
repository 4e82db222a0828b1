use serde::{Deserialize, Serialize};
use text::LineColumn;

use crate::error::TemplateError;
use crate::parser::{parse, TemplateSink};
use crate::rule::{OptionalRule, VariableRule};

/// One element of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateNode {
    Text {
        content: String,
    },
    Optional {
        name: Option<String>,
        children: Vec<TemplateNode>,
    },
    Variable {
        name: String,
        /// Pattern after repetition expansion.
        match_regex: String,
        original_text: String,
        /// The rule's `example` field, when given.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        example: Option<String>,
    },
}

/// Sink that builds a [`TemplateNode`] tree.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    root: Vec<TemplateNode>,
    open: Vec<(Option<String>, Vec<TemplateNode>)>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level nodes collected so far.
    pub fn into_nodes(self) -> Vec<TemplateNode> {
        self.root
    }

    fn current(&mut self) -> &mut Vec<TemplateNode> {
        match self.open.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }
}

impl TemplateSink for TreeBuilder {
    fn text(&mut self, text: &str, _origin: LineColumn) -> Result<(), TemplateError> {
        let nodes = self.current();
        if let Some(TemplateNode::Text { content }) = nodes.last_mut() {
            content.push_str(text);
        } else {
            nodes.push(TemplateNode::Text {
                content: text.to_string(),
            });
        }
        Ok(())
    }

    fn begin_optional(&mut self, rule: &OptionalRule) -> Result<(), TemplateError> {
        self.open.push((rule.name.clone(), Vec::new()));
        Ok(())
    }

    fn end_optional(&mut self, rule: &OptionalRule) -> Result<(), TemplateError> {
        let Some((name, children)) = self.open.pop() else {
            return Err(TemplateError::UnexpectedEndOptional { line: rule.line });
        };
        self.current().push(TemplateNode::Optional { name, children });
        Ok(())
    }

    fn variable(&mut self, rule: &VariableRule) -> Result<(), TemplateError> {
        self.current().push(TemplateNode::Variable {
            name: rule.name().to_string(),
            match_regex: rule.pattern().to_string(),
            original_text: rule.original().to_string(),
            example: rule.example().map(str::to_string),
        });
        Ok(())
    }
}

/// Parses a template into its node tree.
pub fn parse_tree(template: &str) -> Result<Vec<TemplateNode>, TemplateError> {
    let mut builder = TreeBuilder::new();
    parse(template, &mut builder)?;
    Ok(builder.into_nodes())
}
