//! Shorthand parser for tagshift.
//!
//! Parses a stream of tokens (from `tagshift-lexer`) into a [`Forest`].
//! A single left-to-right pass maintains an explicit context stack:
//!
//! - `>` opens a child context whose parents are the current sibling set;
//!   later atoms are attached to *every* parent (fan-out).
//! - `+` adds to the current context, `^` closes one child context.
//! - `(` opens an independent group; `)` (optionally `*N`) splices the group's
//!   content into the enclosing context as if it had been written inline.
//!
//! Nodes live in a draft arena while parsing so that sibling sets can be
//! addressed by index. Every fan-out and multiplier copy is a deep clone; the
//! finished forest shares nothing.

use crate::ast::{AttrValue, Forest, Node, DEFAULT_TAG};
use crate::placeholder::{number, unescape};
use crate::{looks_like_markup, Limits, ParseError};
use tagshift_lexer::{Scanner, Token, TokenKind};

type DraftId = usize;

/// A node under construction. Strings stay raw (escapes, `$` runs) until [`ShorthandParser::build`].
#[derive(Debug, Clone, Default)]
struct Draft {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
    text: Option<String>,
    children: Vec<DraftId>,
    /// Generation index from the nearest multiplier, once known.
    index: Option<usize>,
}

impl Draft {
    fn set_attribute(&mut self, name: String, value: Option<String>) {
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }
}

/// Where atoms parsed in a context end up.
#[derive(Debug)]
enum Scope {
    /// Top level: atoms become roots of the output forest.
    Root(Vec<DraftId>),
    /// Inside `( ... )`: atoms collect into the group's own content.
    Group(Vec<DraftId>),
    /// After `>`: atoms are attached as children of every listed parent.
    ChildOf(Vec<DraftId>),
}

#[derive(Debug)]
struct Context {
    scope: Scope,
    /// Nodes most recently produced in this context; the parents for the next `>`.
    siblings: Vec<DraftId>,
}

impl Context {
    fn new(scope: Scope) -> Self {
        Self {
            scope,
            siblings: Vec::new(),
        }
    }
}

/// Shorthand parser.
///
/// Converts the flat token stream into a forest of [`Node`]s, expanding
/// multipliers and `$` numbering along the way.
pub struct ShorthandParser {
    tokens: Vec<Token>,
    pos: usize,
    drafts: Vec<Draft>,
    root: Context,
    /// Open contexts above the root, innermost last.
    stack: Vec<Context>,
    limits: Limits,
    iterations: usize,
}

impl ShorthandParser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>, limits: Limits) -> Self {
        Self {
            tokens,
            pos: 0,
            drafts: Vec::new(),
            root: Context::new(Scope::Root(Vec::new())),
            stack: Vec::new(),
            limits,
            iterations: 0,
        }
    }

    /// Parse shorthand source with the default [`Limits`].
    ///
    /// Input that looks like verbose markup yields an empty forest.
    pub fn parse(source: &str) -> Result<Forest, ParseError> {
        Self::parse_with_limits(source, Limits::default())
    }

    /// Parse shorthand source with explicit resource limits.
    pub fn parse_with_limits(source: &str, limits: Limits) -> Result<Forest, ParseError> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(Vec::new());
        }
        if looks_like_markup(source) {
            log::debug!(target: "tagshift.shorthand", "input looks like verbose markup, not shorthand");
            return Ok(Vec::new());
        }

        let tokens = Scanner::tokenize(source);
        let mut parser = ShorthandParser::new(tokens, limits);
        parser.parse_forest()
    }

    fn parse_forest(&mut self) -> Result<Forest, ParseError> {
        // Set right after `>` so that a bare `{text}` targets the parents
        let mut descended = false;

        while !self.is_at_end() {
            self.tick()?;

            match &self.peek().kind {
                TokenKind::Child => {
                    self.advance();
                    self.descend()?;
                    descended = true;
                    continue;
                }
                TokenKind::Sibling => self.advance(),
                TokenKind::ClimbUp => {
                    self.advance();
                    self.climb();
                }
                TokenKind::GroupOpen => {
                    self.advance();
                    self.push_context(Scope::Group(Vec::new()))?;
                }
                TokenKind::GroupClose => {
                    self.advance();
                    self.close_group()?;
                }
                TokenKind::Text(text) if descended => {
                    let text = text.clone();
                    self.advance();
                    self.set_parent_text(&text);
                }
                _ if self.peek().starts_atom() => {
                    let atoms = self.parse_atom()?;
                    self.insert(atoms)?;
                }
                other => {
                    log::trace!(target: "tagshift.shorthand", "skipping stray token {other:?}");
                    self.advance();
                }
            }

            descended = false;
        }

        // Close anything left open at end of input
        while !self.stack.is_empty() {
            if matches!(self.current().scope, Scope::Group(_)) {
                self.finish_group(1)?;
            } else {
                self.stack.pop();
            }
        }

        let roots = match &mut self.root.scope {
            Scope::Root(roots) => std::mem::take(roots),
            Scope::Group(_) | Scope::ChildOf(_) => Vec::new(),
        };

        Ok(roots.into_iter().map(|id| self.build(id)).collect())
    }

    // =========================================================================
    // Atoms
    // =========================================================================

    /// Parse one element atom: `tag#id.class[attr]{text}*N`, modifiers in any order.
    /// Modifiers separated from the atom by whitespace start a new atom.
    fn parse_atom(&mut self) -> Result<Vec<DraftId>, ParseError> {
        let mut draft = Draft::default();
        let mut tag = None;
        let mut times = 1;
        let mut last_end: Option<usize> = None;

        while !self.is_at_end() {
            let token = self.peek();
            if last_end.is_some_and(|end| token.span.start != end) {
                break;
            }
            let end = token.span.end;

            match &token.kind {
                TokenKind::Name(name) if last_end.is_none() => tag = Some(name.clone()),
                TokenKind::Id(id) => {
                    if !id.is_empty() {
                        draft.id = Some(id.clone());
                    }
                }
                TokenKind::Class(class) => {
                    if !class.is_empty() {
                        draft.classes.push(class.clone());
                    }
                }
                TokenKind::Attributes(attrs) => {
                    for attr in attrs.clone() {
                        draft.set_attribute(attr.name, attr.value);
                    }
                }
                TokenKind::Text(text) => draft.text = (!text.is_empty()).then(|| text.clone()),
                TokenKind::Multiplier(n) => times = *n,
                _ => break,
            }

            last_end = Some(end);
            self.advance();
        }

        draft.tag = tag.unwrap_or_else(|| DEFAULT_TAG.to_string());

        if times <= 1 {
            return Ok(vec![self.alloc(draft)?]);
        }

        self.reserve(times)?;
        let mut copies = Vec::new();
        for index in 1..=times {
            let id = self.alloc(draft.clone())?;
            self.stamp(id, index);
            copies.push(id);
        }
        Ok(copies)
    }

    /// Place freshly parsed nodes into the current context.
    fn insert(&mut self, nodes: Vec<DraftId>) -> Result<(), ParseError> {
        let parents = match &self.current().scope {
            Scope::ChildOf(parents) => Some(parents.clone()),
            Scope::Root(_) | Scope::Group(_) => None,
        };

        let siblings = match parents {
            Some(parents) => self.attach(&parents, &nodes)?,
            None => {
                if let Scope::Root(members) | Scope::Group(members) = &mut self.current_mut().scope {
                    members.extend(nodes.iter().copied());
                }
                nodes
            }
        };

        self.current_mut().siblings = siblings;
        Ok(())
    }

    /// Attach `nodes` under every parent. The last parent receives the originals,
    /// every other parent an independent deep copy. Returns all attached nodes.
    fn attach(&mut self, parents: &[DraftId], nodes: &[DraftId]) -> Result<Vec<DraftId>, ParseError> {
        if parents.is_empty() {
            log::trace!(target: "tagshift.shorthand", "dropping {} node(s) with no parent", nodes.len());
        }

        // Every parent but the last gets a copy of each node
        self.reserve(parents.len().saturating_sub(1).saturating_mul(nodes.len()))?;
        let mut attached = Vec::new();

        for (i, &parent) in parents.iter().enumerate() {
            let last = i + 1 == parents.len();
            let index = self.drafts[parent].index;

            for &node in nodes {
                let child = if last { node } else { self.clone_subtree(node)? };
                if let Some(index) = index {
                    self.stamp(child, index);
                }
                self.drafts[parent].children.push(child);
                attached.push(child);
            }
        }

        Ok(attached)
    }

    /// `>{text}`: set text on every parent of the current child context.
    fn set_parent_text(&mut self, text: &str) {
        let parents = match &self.current().scope {
            Scope::ChildOf(parents) => parents.clone(),
            Scope::Root(_) | Scope::Group(_) => Vec::new(),
        };

        for parent in parents {
            let draft = &mut self.drafts[parent];
            draft.text = match draft.index {
                _ if text.is_empty() => None,
                Some(index) => Some(number(text, index)),
                None => Some(text.to_string()),
            };
        }
    }

    // =========================================================================
    // Context stack
    // =========================================================================

    fn descend(&mut self) -> Result<(), ParseError> {
        let parents = self.current().siblings.clone();
        self.push_context(Scope::ChildOf(parents))
    }

    /// `^`: leave one child context. Never climbs out of a group or the root.
    fn climb(&mut self) {
        if matches!(self.current().scope, Scope::ChildOf(_)) {
            self.stack.pop();
        } else {
            log::trace!(target: "tagshift.shorthand", "ignoring `^` at group or root level");
        }
    }

    fn close_group(&mut self) -> Result<(), ParseError> {
        if !self
            .stack
            .iter()
            .any(|ctx| matches!(ctx.scope, Scope::Group(_)))
        {
            log::trace!(target: "tagshift.shorthand", "ignoring `)` without an open group");
            return Ok(());
        }

        let multiplier = match &self.peek().kind {
            TokenKind::Multiplier(n) => Some(*n),
            _ => None,
        };
        if multiplier.is_some() {
            self.advance();
        }

        self.finish_group(multiplier.unwrap_or(1))
    }

    /// Pop up to and including the innermost group, multiply its content and
    /// splice it into the enclosing context.
    fn finish_group(&mut self, times: usize) -> Result<(), ParseError> {
        let mut members = Vec::new();
        while let Some(ctx) = self.stack.pop() {
            if let Scope::Group(content) = ctx.scope {
                members = content;
                break;
            }
        }

        let content = if times > 1 && !members.is_empty() {
            self.reserve(members.len().saturating_mul(times - 1))?;

            // Copies are taken before the originals get stamped with index 1
            let mut copies = Vec::new();
            for index in 2..=times {
                for &member in &members {
                    let copy = self.clone_subtree(member)?;
                    self.stamp(copy, index);
                    copies.push(copy);
                }
            }
            for &member in &members {
                self.stamp(member, 1);
            }
            members.extend(copies);
            members
        } else {
            members
        };

        self.insert(content)
    }

    fn push_context(&mut self, scope: Scope) -> Result<(), ParseError> {
        if self.stack.len() + 1 >= self.limits.max_depth {
            log::warn!(target: "tagshift.shorthand", "nesting depth limit {} reached", self.limits.max_depth);
            return Err(ParseError::DepthLimit {
                limit: self.limits.max_depth,
            });
        }
        self.stack.push(Context::new(scope));
        Ok(())
    }

    fn current(&self) -> &Context {
        self.stack.last().unwrap_or(&self.root)
    }

    fn current_mut(&mut self) -> &mut Context {
        match self.stack.last_mut() {
            Some(ctx) => ctx,
            None => &mut self.root,
        }
    }

    // =========================================================================
    // Draft arena
    // =========================================================================

    fn alloc(&mut self, draft: Draft) -> Result<DraftId, ParseError> {
        self.reserve(1)?;
        self.drafts.push(draft);
        Ok(self.drafts.len() - 1)
    }

    /// Fail before `extra` more drafts would exceed the node budget.
    fn reserve(&self, extra: usize) -> Result<(), ParseError> {
        if self.drafts.len().saturating_add(extra) > self.limits.max_nodes {
            log::warn!(target: "tagshift.shorthand", "node limit {} reached", self.limits.max_nodes);
            return Err(ParseError::NodeLimit {
                limit: self.limits.max_nodes,
            });
        }
        Ok(())
    }

    /// Deep-copy a draft subtree into fresh arena slots.
    fn clone_subtree(&mut self, id: DraftId) -> Result<DraftId, ParseError> {
        let mut draft = self.drafts[id].clone();
        let children = std::mem::take(&mut draft.children);
        let copy = self.alloc(draft)?;

        for child in children {
            let child_copy = self.clone_subtree(child)?;
            self.drafts[copy].children.push(child_copy);
        }

        Ok(copy)
    }

    /// Apply a generation index to a subtree. A node that already carries its
    /// own index keeps it, and passes it down instead.
    fn stamp(&mut self, id: DraftId, index: usize) {
        let draft = &mut self.drafts[id];
        let index = *draft.index.get_or_insert(index);

        if let Some(value) = draft.id.as_mut() {
            *value = number(value, index);
        }
        for class in &mut draft.classes {
            *class = number(class, index);
        }
        for (_, value) in &mut draft.attributes {
            if let Some(value) = value.as_mut() {
                *value = number(value, index);
            }
        }
        if let Some(text) = draft.text.as_mut() {
            *text = number(text, index);
        }

        let children = draft.children.clone();
        for child in children {
            self.stamp(child, index);
        }
    }

    /// Turn a finished draft subtree into an owned [`Node`], resolving escapes.
    fn build(&self, id: DraftId) -> Node {
        let draft = &self.drafts[id];
        Node {
            tag: draft.tag.clone(),
            id: draft.id.as_deref().map(unescape),
            classes: draft.classes.iter().map(|c| unescape(c)).collect(),
            attributes: draft
                .attributes
                .iter()
                .map(|(name, value)| {
                    let value = match value {
                        Some(v) => AttrValue::Text(unescape(v)),
                        None => AttrValue::Flag,
                    };
                    (name.clone(), value)
                })
                .collect(),
            text: draft.text.as_deref().map(unescape),
            children: draft.children.iter().map(|&c| self.build(c)).collect(),
        }
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn tick(&mut self) -> Result<(), ParseError> {
        self.iterations += 1;
        if self.iterations > self.limits.max_iterations {
            log::warn!(
                target: "tagshift.shorthand",
                "iteration limit {} reached at token {}",
                self.limits.max_iterations,
                self.pos
            );
            return Err(ParseError::IterationLimit {
                limit: self.limits.max_iterations,
            });
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        static EOF: std::sync::LazyLock<Token> = std::sync::LazyLock::new(|| {
            Token::new(TokenKind::Eof, tagshift_lexer::Span::new(0, 0, 0, 0))
        });
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }
}
