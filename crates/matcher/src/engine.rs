use std::io::Read;
use std::time::Instant;

use fxhash::FxHashMap;
use text::{collapse_whitespace, LineColumn, TokenizedText};
use tracing::{debug, warn, Level};

use crate::compile::{CompiledTemplate, Element};
use crate::types::{DifferenceDescription, MatchConfig, MatchError};


/// Compares license templates against text.
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    cfg: MatchConfig,
}

impl TemplateMatcher {
    pub fn new(cfg: MatchConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    pub fn compile(&self, template: &str) -> Result<CompiledTemplate, MatchError> {
        Ok(CompiledTemplate::compile(template, &self.cfg.normalize)?)
    }

    /// Strips comments from `text` and tokenizes it with this matcher's rules.
    pub fn prepare(&self, text: &str) -> TokenizedText {
        TokenizedText::new(text, &self.cfg.normalize)
    }

    /// Compares the whole of `text` against `template`.
    ///
    /// A malformed template is an error. A text that does not match is not;
    /// it yields a description with `difference_found` set.
    pub fn compare(&self, template: &str, text: &str) -> Result<DifferenceDescription, MatchError> {
        let compiled = self.compile(template)?;
        Ok(self.compare_compiled(&compiled, &self.prepare(text)))
    }

    /// Like [`compare`](Self::compare), reading the text from `reader`.
    ///
    /// A read failure is not fatal: the bytes read before it are compared.
    pub fn compare_reader<R: Read>(
        &self,
        template: &str,
        reader: R,
    ) -> Result<DifferenceDescription, MatchError> {
        let compiled = self.compile(template)?;
        let text = read_lossy(reader);
        Ok(self.compare_compiled(&compiled, &self.prepare(&text)))
    }

    pub fn compare_compiled(
        &self,
        template: &CompiledTemplate,
        text: &TokenizedText,
    ) -> DifferenceDescription {
        let start = Instant::now();
        let span = tracing::span!(Level::DEBUG, "matcher.compare");
        let _guard = span.enter();

        let mut walk = Walk::new(template, text, Mode::Exact);
        let result = match walk.solve(template.entry(), 0) {
            Outcome::Match => DifferenceDescription::no_difference(walk.regions()),
            Outcome::Fail(divergence) => walk.describe(divergence, self.cfg.context_tokens),
        };

        debug!(
            template_tokens = template.token_count(),
            candidate_tokens = text.len(),
            difference_found = result.difference_found,
            elapsed_micros = start.elapsed().as_micros(),
            "template_compare"
        );
        result
    }

    /// True if `template` matches a contiguous run of tokens somewhere in
    /// `full_text`. Empty text never contains anything.
    pub fn is_within_text(&self, template: &str, full_text: &str) -> Result<bool, MatchError> {
        let compiled = self.compile(template)?;
        Ok(self.contains_compiled(&compiled, &self.prepare(full_text)))
    }

    pub fn contains_compiled(&self, template: &CompiledTemplate, text: &TokenizedText) -> bool {
        if text.is_empty() {
            return false;
        }
        let mut walk = Walk::new(template, text, Mode::Contains);
        let starts: Vec<usize> = match template.leading_token(template.entry()) {
            Some(first) => walk.positions_of(first).to_vec(),
            None => (0..text.len()).collect(),
        };
        starts
            .into_iter()
            .any(|start| walk.accepts(template.entry(), start))
    }
}

/// Compares `text` against `template` with the default configuration.
pub fn compare(template: &str, text: &str) -> Result<DifferenceDescription, MatchError> {
    TemplateMatcher::default().compare(template, text)
}

/// Contains-match with the default configuration.
pub fn is_within_text(template: &str, full_text: &str) -> Result<bool, MatchError> {
    TemplateMatcher::default().is_within_text(template, full_text)
}

fn read_lossy<R: Read>(reader: R) -> String {
    let mut reader = std::io::BufReader::new(reader);
    let mut bytes = Vec::new();
    if let Err(err) = reader.read_to_end(&mut bytes) {
        warn!(
            error = %err,
            bytes_read = bytes.len(),
            "text read failed; comparing the bytes read so far"
        );
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// The template must cover the whole text.
    Exact,
    /// The template may match any contiguous run of tokens.
    Contains,
}

/// Where an interpretation of the template stopped matching.
#[derive(Debug, Clone, Copy)]
enum Divergence {
    /// Candidate token `at` differs from token `offset` of text node `node`.
    Mismatch { at: usize, node: usize, offset: usize },
    /// The candidate ran out while text node `node` still expected tokens.
    Missing { at: usize, node: usize, offset: usize },
    /// The template ended with candidate tokens left over.
    Additional { at: usize },
    /// No span starting at `at` satisfies the variable's pattern.
    Variable { at: usize, node: usize },
}

impl Divergence {
    /// Candidate position reached.
    fn reach(&self) -> usize {
        match *self {
            Divergence::Mismatch { at, .. }
            | Divergence::Missing { at, .. }
            | Divergence::Additional { at }
            | Divergence::Variable { at, .. } => at,
        }
    }

    /// Template position reached. Node ids follow template order.
    fn progress(&self) -> (usize, usize) {
        match *self {
            Divergence::Mismatch { node, offset, .. } | Divergence::Missing { node, offset, .. } => {
                (node, offset)
            }
            Divergence::Variable { node, .. } => (node, 0),
            Divergence::Additional { .. } => (usize::MAX, 0),
        }
    }
}

/// Keeps `candidate` if it is strictly better than `best` under `key`.
fn keep_best<K: Ord>(
    best: &mut Option<Divergence>,
    candidate: Option<Divergence>,
    key: impl Fn(&Divergence) -> K,
) {
    let Some(candidate) = candidate else {
        return;
    };
    if best
        .as_ref()
        .is_none_or(|existing| key(existing) < key(&candidate))
    {
        *best = Some(candidate);
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Match,
    /// No interpretation matched; the most informative divergence, if any.
    Fail(Option<Divergence>),
}

impl Outcome {
    fn is_match(self) -> bool {
        matches!(self, Outcome::Match)
    }

    fn divergence(self) -> Option<Divergence> {
        match self {
            Outcome::Match => None,
            Outcome::Fail(divergence) => divergence,
        }
    }
}

/// One traversal of a compiled template over a text.
///
/// `solve(node, pos)` answers whether the template from `node` onwards can
/// match the text from token `pos`, and if not, where it diverged. Answers are
/// memoized per `(node, pos)`, so optional regions and variables do not cause
/// exponential backtracking.
///
/// When every interpretation fails, optional alternatives report the one that
/// got furthest into the text. Variable alternatives report the one that got
/// furthest into the template, so a variable that swallowed text up to a
/// later repeat of the following word does not hide the real divergence.
struct Walk<'a> {
    template: &'a CompiledTemplate,
    text: &'a TokenizedText,
    mode: Mode,
    memo: FxHashMap<(usize, usize), Outcome>,
    positions: FxHashMap<&'a str, Vec<usize>>,
}

impl<'a> Walk<'a> {
    fn new(template: &'a CompiledTemplate, text: &'a TokenizedText, mode: Mode) -> Self {
        let mut positions: FxHashMap<&'a str, Vec<usize>> = FxHashMap::default();
        for (idx, token) in text.tokens().iter().enumerate() {
            positions.entry(token.text.as_str()).or_default().push(idx);
        }
        Self {
            template,
            text,
            mode,
            memo: FxHashMap::default(),
            positions,
        }
    }

    /// Ascending candidate positions holding `token`.
    fn positions_of(&self, token: &str) -> &[usize] {
        self.positions
            .get(token)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn accepts(&mut self, node: Option<usize>, pos: usize) -> bool {
        self.solve(node, pos).is_match()
    }

    fn solve(&mut self, node: Option<usize>, pos: usize) -> Outcome {
        let Some(id) = node else {
            return self.at_end(pos);
        };
        if let Some(&known) = self.memo.get(&(id, pos)) {
            return known;
        }

        let template = self.template;
        let current = template.node(id);
        let outcome = match &current.element {
            Element::Text(_) => match self.match_text(id, pos) {
                Ok(end) => self.solve(current.next, end),
                Err(divergence) => Outcome::Fail(Some(divergence)),
            },
            Element::Optional { body } => {
                let present = match body {
                    Some(_) => self.solve(*body, pos),
                    None => Outcome::Fail(None),
                };
                if present.is_match() {
                    Outcome::Match
                } else {
                    match self.solve(current.next, pos) {
                        Outcome::Match => Outcome::Match,
                        Outcome::Fail(absent) => {
                            let mut best = present.divergence();
                            keep_best(&mut best, absent, Divergence::reach);
                            Outcome::Fail(best)
                        }
                    }
                }
            }
            Element::Variable { .. } => match self.variable_ends(id, pos) {
                Err(divergence) => Outcome::Fail(Some(divergence)),
                Ok(ends) => {
                    let mut best = None;
                    let mut matched = false;
                    for end in ends {
                        match self.solve(current.next, end) {
                            Outcome::Match => {
                                matched = true;
                                break;
                            }
                            Outcome::Fail(divergence) => keep_best(&mut best, divergence, |d| {
                                (d.progress(), d.reach())
                            }),
                        }
                    }
                    if matched {
                        Outcome::Match
                    } else {
                        Outcome::Fail(best)
                    }
                }
            },
        };

        self.memo.insert((id, pos), outcome);
        outcome
    }

    fn at_end(&self, pos: usize) -> Outcome {
        match self.mode {
            Mode::Contains => Outcome::Match,
            Mode::Exact if pos == self.text.len() => Outcome::Match,
            Mode::Exact => Outcome::Fail(Some(Divergence::Additional { at: pos })),
        }
    }

    /// Matches the text node `id` at `pos`; returns the position after it.
    fn match_text(&self, id: usize, pos: usize) -> Result<usize, Divergence> {
        let Element::Text(expected) = &self.template.node(id).element else {
            return Ok(pos);
        };
        for (offset, token) in expected.iter().enumerate() {
            let at = pos + offset;
            match self.text.token(at) {
                None => {
                    return Err(Divergence::Missing {
                        at,
                        node: id,
                        offset,
                    })
                }
                Some(actual) if actual.text != token.text => {
                    return Err(Divergence::Mismatch {
                        at,
                        node: id,
                        offset,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(pos + expected.len())
    }

    /// End positions a variable at `pos` may extend to, longest first.
    fn variable_ends(&self, id: usize, pos: usize) -> Result<Vec<usize>, Divergence> {
        let template = self.template;
        let current = template.node(id);
        let Element::Variable { rule, literal } = &current.element else {
            return Ok(vec![pos]);
        };
        let n = self.text.len();

        let candidates: Vec<usize> = match template.leading_token(current.next) {
            Some(first) => self
                .positions_of(first)
                .iter()
                .rev()
                .copied()
                .filter(|&end| end >= pos)
                .collect(),
            None if current.next.is_none() && self.mode == Mode::Exact => vec![n],
            None if current.next.is_none() => (pos..=n).collect(),
            None => (pos..=n).rev().collect(),
        };

        if candidates.is_empty() {
            // The text that should follow the variable never appears; report
            // it against the following text node.
            if let Some(next) = current.next {
                if let Err(divergence) = self.match_text(next, pos) {
                    return Err(divergence);
                }
            }
            return Err(Divergence::Variable { at: pos, node: id });
        }

        let accepted: Vec<usize> = candidates
            .into_iter()
            .filter(|&end| self.variable_accepts(rule, literal.as_deref(), pos, end))
            .collect();
        if accepted.is_empty() {
            return Err(Divergence::Variable { at: pos, node: id });
        }
        Ok(accepted)
    }

    fn variable_accepts(
        &self,
        rule: &template::VariableRule,
        literal: Option<&str>,
        start: usize,
        end: usize,
    ) -> bool {
        if let Some(word) = literal {
            if end == start + 1 && self.text.token(start).is_some_and(|t| t.text == word) {
                return true;
            }
        }
        if let Some(limit) = rule.length_limit() {
            return limit.allows(self.text.normalized_char_len(start, end));
        }
        rule.accepts(self.text.normalized_span(start, end))
            || rule.accepts(&collapse_whitespace(self.text.original_span(start, end)))
    }

    /// Candidate ranges covered by required text along the accepted path.
    /// Only meaningful after `accepts(entry, 0)` returned true.
    fn regions(&mut self) -> Vec<(usize, usize)> {
        let template = self.template;
        let mut regions: Vec<(usize, usize)> = Vec::new();
        let mut node = template.entry();
        let mut pos = 0usize;

        while let Some(id) = node {
            let current = template.node(id);
            match &current.element {
                Element::Text(tokens) => {
                    let end = pos + tokens.len();
                    if current.optional_depth == 0 {
                        match regions.last_mut() {
                            Some(last) if last.1 == pos => last.1 = end,
                            _ => regions.push((pos, end)),
                        }
                    }
                    pos = end;
                    node = current.next;
                }
                Element::Optional { body } => {
                    node = if body.is_some() && self.accepts(*body, pos) {
                        *body
                    } else {
                        current.next
                    };
                }
                Element::Variable { .. } => {
                    let next = current.next;
                    let Some(end) = self
                        .variable_ends(id, pos)
                        .unwrap_or_default()
                        .into_iter()
                        .find(|&end| self.accepts(next, end))
                    else {
                        break;
                    };
                    pos = end;
                    node = next;
                }
            }
        }
        regions
    }

    fn describe(&self, divergence: Option<Divergence>, context_tokens: usize) -> DifferenceDescription {
        let Some(divergence) = divergence else {
            return DifferenceDescription::difference("Template does not match the text", None);
        };
        match divergence {
            Divergence::Mismatch { at, node, offset } => {
                let location = self.location(at);
                DifferenceDescription::difference(
                    format!(
                        "Normal text of license does not match starting at line #{} column #{} \"{}\" when comparing to template text \"{}\"",
                        location.line,
                        location.column,
                        self.text_context(at, context_tokens),
                        self.template_context(node, offset, context_tokens),
                    ),
                    Some(location),
                )
            }
            Divergence::Missing { node, offset, .. } => DifferenceDescription::difference(
                format!(
                    "End of license text reached with missing text starting with \"{}\"",
                    self.template_context(node, offset, context_tokens),
                ),
                self.last_location(),
            ),
            Divergence::Additional { at } => {
                let location = self.location(at);
                DifferenceDescription::difference(
                    format!(
                        "Additional text found after the end of the template starting at line #{} column #{} \"{}\"",
                        location.line,
                        location.column,
                        self.text_context(at, context_tokens),
                    ),
                    Some(location),
                )
            }
            Divergence::Variable { at, node } => {
                let name = match &self.template.node(node).element {
                    Element::Variable { rule, .. } => rule.name(),
                    _ => "",
                };
                let location = self
                    .text
                    .token(at)
                    .map(|token| token.location())
                    .or_else(|| self.last_location());
                DifferenceDescription::difference(
                    format!(
                        "Variable text rule \"{}\" did not match the text starting at line #{} column #{} \"{}\"",
                        name,
                        location.map_or(0, |l| l.line),
                        location.map_or(0, |l| l.column),
                        self.text_context(at, context_tokens),
                    ),
                    location,
                )
            }
        }
    }

    fn location(&self, at: usize) -> LineColumn {
        self.text
            .token(at)
            .map(|token| token.location())
            .or_else(|| self.last_location())
            .unwrap_or_default()
    }

    fn last_location(&self) -> Option<LineColumn> {
        self.text.tokens().last().map(|token| token.location())
    }

    fn text_context(&self, at: usize, count: usize) -> String {
        let end = (at + count).min(self.text.len());
        self.text.normalized_span(at, end).to_string()
    }

    fn template_context(&self, node: usize, offset: usize, count: usize) -> String {
        match &self.template.node(node).element {
            Element::Text(tokens) => tokens
                .iter()
                .skip(offset)
                .take(count)
                .map(|token| token.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            _ => String::new(),
        }
    }
}
