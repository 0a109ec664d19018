//! Verbose markup parser for tagshift.
//!
//! A forgiving recursive-descent tag scanner. It never rejects input:
//! unterminated tags close at end of input, closing-tag names are read but not
//! checked, and comments / declarations / processing instructions are skipped.

use crate::ast::{AttrValue, Forest, Node};
use crate::entity;
use crate::{Limits, ParseError};
use tagshift_lexer::{is_tag_char, is_void_element};

/// Verbose markup parser.
///
/// - `Vec<char>` source with a position cursor
/// - Every loop iteration either consumes input or is forced to
pub struct MarkupParser {
    chars: Vec<char>,
    pos: usize,
    limits: Limits,
    iterations: usize,
    elements: usize,
}

impl MarkupParser {
    pub fn new(source: &str, limits: Limits) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            limits,
            iterations: 0,
            elements: 0,
        }
    }

    /// Parse markup with the default [`Limits`].
    pub fn parse(source: &str) -> Result<Forest, ParseError> {
        Self::parse_with_limits(source, Limits::default())
    }

    /// Parse markup with explicit resource limits.
    pub fn parse_with_limits(source: &str, limits: Limits) -> Result<Forest, ParseError> {
        let source = source.trim();
        if !source.contains('<') {
            return Ok(Vec::new());
        }

        let mut parser = MarkupParser::new(source, limits);
        // Top-level text has nowhere to go
        let (roots, _) = parser.parse_content(0)?;
        Ok(roots)
    }

    /// Parse element content until a closing tag or end of input.
    /// Returns the child elements and the joined text.
    fn parse_content(&mut self, depth: usize) -> Result<(Vec<Node>, Option<String>), ParseError> {
        let mut children = Vec::new();
        let mut texts: Vec<String> = Vec::new();

        while !self.is_at_end() {
            self.tick()?;
            let before = self.pos;

            if self.starts_with("<!--") {
                self.skip_past("-->");
            } else if self.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let content = self.take_until("]]>");
                push_text(&mut texts, &content);
            } else if self.starts_with("<!") || self.starts_with("<?") {
                self.skip_past(">");
            } else if self.starts_with("</") {
                if depth > 0 {
                    self.skip_past(">");
                    break;
                }
                log::trace!(target: "tagshift.markup", "ignoring stray closing tag at {}", self.pos);
                self.skip_past(">");
            } else if self.peek() == '<' && is_tag_char(self.peek_at(1)) {
                let child = self.parse_element(depth + 1)?;
                children.push(child);
            } else {
                let run = self.take_text_run();
                push_text(&mut texts, &run);
            }

            if self.pos == before {
                self.pos += 1;
            }
        }

        let text = (!texts.is_empty()).then(|| texts.join(" "));
        Ok((children, text))
    }

    /// Parse `<name attrs...>content</name>` starting at `<`.
    fn parse_element(&mut self, depth: usize) -> Result<Node, ParseError> {
        if depth > self.limits.max_depth {
            log::warn!(target: "tagshift.markup", "nesting depth limit {} reached", self.limits.max_depth);
            return Err(ParseError::DepthLimit {
                limit: self.limits.max_depth,
            });
        }

        self.elements += 1;
        if self.elements > self.limits.max_nodes {
            log::warn!(target: "tagshift.markup", "node limit {} reached", self.limits.max_nodes);
            return Err(ParseError::NodeLimit {
                limit: self.limits.max_nodes,
            });
        }

        self.advance(); // consume <
        let mut tag = String::new();
        while !self.is_at_end() && is_tag_char(self.peek()) {
            tag.push(self.peek());
            self.advance();
        }

        let mut node = Node::new(tag);
        let self_closing = self.parse_attributes(&mut node);

        if self_closing {
            return Ok(node);
        }

        if is_void_element(&node.tag) {
            self.skip_void_close(&node.tag);
            return Ok(node);
        }

        let (children, text) = self.parse_content(depth)?;
        node.children = children;
        node.text = text;
        Ok(node)
    }

    /// Parse attributes up to `>` or `/>`. Returns true for a self-closing tag.
    fn parse_attributes(&mut self, node: &mut Node) -> bool {
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                return true;
            }
            if self.peek() == '>' {
                self.advance();
                return false;
            }
            if self.starts_with("/>") {
                self.pos += 2;
                return true;
            }

            let name = self.take_while(is_attribute_char);
            if name.is_empty() {
                // Junk inside the tag: drop it
                self.advance();
                continue;
            }

            self.skip_whitespace();
            if self.peek() != '=' {
                node.attributes.insert(name, AttrValue::Flag);
                continue;
            }
            self.advance(); // consume =
            self.skip_whitespace();
            let value = entity::decode(&self.parse_attribute_value());

            match name.as_str() {
                "id" => {
                    if !value.is_empty() {
                        node.id = Some(value);
                    }
                }
                "class" => node
                    .classes
                    .extend(value.split_whitespace().map(str::to_string)),
                _ => node.attributes.insert(name, AttrValue::Text(value)),
            }
        }
    }

    fn parse_attribute_value(&mut self) -> String {
        let quote = self.peek();
        if quote == '"' || quote == '\'' {
            self.advance();
            let value = self.take_while(|c| c != quote);
            self.advance(); // consume closing quote
            return value;
        }

        let mut value = String::new();
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_whitespace() || c == '>' || (c == '/' && self.peek_at(1) == '>') {
                break;
            }
            value.push(c);
            self.advance();
        }
        value
    }

    /// Consume an immediately following `</name>` after a void element.
    fn skip_void_close(&mut self, tag: &str) {
        let save = self.pos;
        if !self.starts_with("</") {
            return;
        }
        self.pos += 2;
        let name = self.take_while(is_tag_char);
        self.skip_whitespace();
        if name.eq_ignore_ascii_case(tag) && self.peek() == '>' {
            self.advance();
        } else {
            self.pos = save;
        }
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn tick(&mut self) -> Result<(), ParseError> {
        self.iterations += 1;
        if self.iterations > self.limits.max_iterations {
            log::warn!(
                target: "tagshift.markup",
                "iteration limit {} reached at offset {}",
                self.limits.max_iterations,
                self.pos
            );
            return Err(ParseError::IterationLimit {
                limit: self.limits.max_iterations,
            });
        }
        Ok(())
    }

    fn take_text_run(&mut self) -> String {
        let mut run = String::new();
        // A `<` that opens nothing is just text
        if self.peek() == '<' {
            run.push('<');
            self.advance();
        }
        run.push_str(&self.take_while(|c| c != '<'));
        run
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while !self.is_at_end() && pred(self.peek()) {
            out.push(self.peek());
            self.advance();
        }
        out
    }

    /// Take everything up to `end`, then skip `end` itself.
    fn take_until(&mut self, end: &str) -> String {
        let mut out = String::new();
        while !self.is_at_end() && !self.starts_with(end) {
            out.push(self.peek());
            self.advance();
        }
        self.pos = (self.pos + end.chars().count()).min(self.chars.len());
        out
    }

    fn skip_past(&mut self, end: &str) {
        self.take_until(end);
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.pos + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

fn is_attribute_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '@' | '-')
}

fn push_text(texts: &mut Vec<String>, run: &str) {
    let run = run.trim();
    if !run.is_empty() {
        texts.push(run.to_string());
    }
}
