//! Lexer for rule patterns and replacements.
//!
//! Tokenizes selectors such as `svg:X:rect.icon + Y` and `ul.list>X`.
//!
//! # Examples
//!
//! ```
//! use tagshift_parser::rule_lexer::{RuleLexer, RuleTokenKind};
//!
//! let tokens = RuleLexer::tokenize("A+b.c");
//! assert_eq!(tokens[0].kind, RuleTokenKind::Ident("A".into()));
//! assert_eq!(tokens[1].kind, RuleTokenKind::Plus);
//! assert_eq!(tokens[3].kind, RuleTokenKind::Dot);
//! ```

/// Token classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTokenKind {
    Ident(String),
    Colon,
    Dot,
    Hash,
    Plus,
    Gt,
    Unknown(char),
    Eof,
}

/// A token produced by the rule lexer. `offset` is a char index into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleToken {
    pub kind: RuleTokenKind,
    pub offset: usize,
}

pub struct RuleLexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<RuleToken>,
}

impl RuleLexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole source. Never fails; always ends with `Eof`.
    pub fn tokenize(source: &str) -> Vec<RuleToken> {
        let mut lexer = RuleLexer::new(source);
        lexer.scan_tokens();
        lexer.tokens
    }

    fn scan_tokens(&mut self) {
        while self.pos < self.chars.len() {
            let start = self.pos;
            let c = self.chars[self.pos];

            let kind = match c {
                c if c.is_whitespace() => {
                    self.pos += 1;
                    continue;
                }
                ':' => RuleTokenKind::Colon,
                '.' => RuleTokenKind::Dot,
                '#' => RuleTokenKind::Hash,
                '+' => RuleTokenKind::Plus,
                '>' => RuleTokenKind::Gt,
                c if is_ident_char(c) => {
                    let mut ident = String::new();
                    while self.pos < self.chars.len() && is_ident_char(self.chars[self.pos]) {
                        ident.push(self.chars[self.pos]);
                        self.pos += 1;
                    }
                    self.tokens.push(RuleToken {
                        kind: RuleTokenKind::Ident(ident),
                        offset: start,
                    });
                    continue;
                }
                c => RuleTokenKind::Unknown(c),
            };

            self.pos += 1;
            self.tokens.push(RuleToken {
                kind,
                offset: start,
            });
        }

        self.tokens.push(RuleToken {
            kind: RuleTokenKind::Eof,
            offset: self.pos,
        });
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_')
}
