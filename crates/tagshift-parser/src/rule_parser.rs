//! Rule parser for tagshift.
//!
//! Parses rule token streams (from `rule_lexer`) into a search [`Pattern`] or
//! a replacement [`Template`]. Both sides share one selector grammar:
//!
//! ```text
//! selector := [ns ':'] Key [':' qualifier] ('#' id)? ('.' class)*
//! pattern  := selector ('+' selector)*
//! template := chain ('+' chain)*
//! chain    := selector ('>' selector)*
//! ```
//!
//! A `Key` starting with an uppercase letter is a capture variable, anything
//! else is a literal tag. With two colon-separated parts the first is a
//! namespace unless it is itself uppercase (`X:rect` = variable `X`
//! constrained to `rect`). An empty namespace (`:X`) means "no namespace".
//!
//! Parsing never fails. Stray tokens are skipped, so a caller detects unusable
//! input by checking for an empty result.

use crate::ast::{Namespace, Pattern, PatternElement, Template, TemplateKind, TemplateNode};
use crate::rule_lexer::{RuleLexer, RuleToken, RuleTokenKind};

/// One parsed `[ns:]Key[:qualifier]#id.class` token, before it is given a role.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    namespace: Option<Namespace>,
    key: String,
    qualifier: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    fn is_variable(&self) -> bool {
        starts_uppercase(&self.key)
    }

    /// Full literal tag, including a namespace prefix if one was given.
    fn literal_tag(&self) -> String {
        match &self.namespace {
            Some(Namespace::Prefix(ns)) => format!("{ns}:{}", self.key),
            _ => self.key.clone(),
        }
    }

    fn into_pattern_element(self) -> PatternElement {
        if self.is_variable() {
            PatternElement::Variable {
                name: self.key,
                tag_constraint: self.qualifier,
                namespace_constraint: self.namespace,
                required_id: self.id,
                required_classes: self.classes,
            }
        } else {
            PatternElement::Literal {
                tag: self.literal_tag(),
                required_id: self.id,
                required_classes: self.classes,
            }
        }
    }

    fn into_template_node(self) -> TemplateNode {
        let kind = if self.is_variable() {
            TemplateKind::VariableRef {
                name: self.key,
                rename_local: self.qualifier,
                rename_namespace: self.namespace,
            }
        } else {
            TemplateKind::NewLiteral {
                tag: self.literal_tag(),
            }
        };

        TemplateNode {
            kind,
            add_id: self.id,
            add_classes: self.classes,
            children: Vec::new(),
        }
    }
}

/// Rule parser.
pub struct RuleParser {
    tokens: Vec<RuleToken>,
    pos: usize,
}

impl RuleParser {
    pub fn new(tokens: Vec<RuleToken>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a search pattern: `+`-separated selectors.
    pub fn parse_pattern(source: &str) -> Pattern {
        let mut parser = RuleParser::new(RuleLexer::tokenize(source));
        let mut elements = Vec::new();

        while !parser.is_at_end() {
            if parser.starts_selector() {
                if let Some(selector) = parser.parse_selector() {
                    elements.push(selector.into_pattern_element());
                }
            } else {
                parser.skip_token("pattern");
            }
        }

        Pattern { elements }
    }

    /// Parse a replacement template: `+`-separated `>` chains.
    pub fn parse_template(source: &str) -> Template {
        let mut parser = RuleParser::new(RuleLexer::tokenize(source));
        let mut nodes = Vec::new();

        while !parser.is_at_end() {
            if parser.starts_selector() {
                if let Some(node) = parser.parse_chain() {
                    nodes.push(node);
                }
            } else {
                parser.skip_token("replacement");
            }
        }

        Template { nodes }
    }

    /// `a>B>c` becomes `a` containing `B` containing `c`.
    fn parse_chain(&mut self) -> Option<TemplateNode> {
        let mut chain = Vec::new();

        loop {
            if let Some(selector) = self.parse_selector() {
                chain.push(selector.into_template_node());
            }
            if matches!(self.peek(), RuleTokenKind::Gt) {
                self.advance();
            } else {
                break;
            }
        }

        let mut node = chain.pop()?;
        while let Some(mut parent) = chain.pop() {
            parent.children.push(node);
            node = parent;
        }
        Some(node)
    }

    fn parse_selector(&mut self) -> Option<Selector> {
        if !self.starts_selector() {
            return None;
        }

        let mut parts = vec![self.take_ident().unwrap_or_default()];
        while matches!(self.peek(), RuleTokenKind::Colon) {
            self.advance();
            parts.push(self.take_ident().unwrap_or_default());
        }

        let mut id = None;
        let mut classes = Vec::new();
        loop {
            match self.peek() {
                RuleTokenKind::Hash => {
                    self.advance();
                    if let Some(value) = self.take_ident() {
                        id = Some(value);
                    }
                }
                RuleTokenKind::Dot => {
                    self.advance();
                    if let Some(class) = self.take_ident() {
                        classes.push(class);
                    }
                }
                _ => break,
            }
        }

        let (namespace, key, qualifier) = split_parts(parts);
        if key.is_empty() {
            log::trace!(target: "tagshift.rules", "dropping selector without a key");
            return None;
        }

        Some(Selector {
            namespace,
            key,
            qualifier,
            id,
            classes,
        })
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn starts_selector(&self) -> bool {
        matches!(self.peek(), RuleTokenKind::Ident(_) | RuleTokenKind::Colon)
    }

    fn take_ident(&mut self) -> Option<String> {
        match self.peek() {
            RuleTokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    fn skip_token(&mut self, context: &str) {
        if !matches!(self.peek(), RuleTokenKind::Plus) {
            log::trace!(target: "tagshift.rules", "skipping {:?} in {context}", self.peek());
        }
        self.advance();
    }

    fn peek(&self) -> &RuleTokenKind {
        static EOF: RuleTokenKind = RuleTokenKind::Eof;
        self.tokens.get(self.pos).map_or(&EOF, |t| &t.kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), RuleTokenKind::Eof)
    }
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_uppercase)
}

/// Assign colon-separated parts to namespace / key / qualifier.
fn split_parts(parts: Vec<String>) -> (Option<Namespace>, String, Option<String>) {
    let namespace = |ns: String| {
        if ns.is_empty() {
            Namespace::Absent
        } else {
            Namespace::Prefix(ns)
        }
    };
    let qualifier = |q: String| (!q.is_empty()).then_some(q);

    let mut parts = parts.into_iter();
    let first = parts.next().unwrap_or_default();
    let Some(second) = parts.next() else {
        return (None, first, None);
    };

    match parts.next() {
        Some(third) => {
            if parts.next().is_some() {
                log::trace!(target: "tagshift.rules", "ignoring extra `:` parts in selector");
            }
            (Some(namespace(first)), second, qualifier(third))
        }
        None if !first.is_empty() && starts_uppercase(&first) => (None, first, qualifier(second)),
        None => (Some(namespace(first)), second, None),
    }
}
