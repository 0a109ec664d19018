//! tagshift Parser
//!
//! Turns text into the shared [`Node`] forest. Includes both the shorthand
//! parser (operator abbreviations with multipliers and `$` numbering) and the
//! verbose markup parser, plus the small rule language used to describe
//! search patterns and replacement templates.
//!
//! Malformed input is never an error: both markup parsers produce a
//! best-effort forest. The only failures are resource [`Limits`] being hit.

pub mod ast;
pub mod entity;
pub mod markup;
pub mod placeholder;
pub mod rule_lexer;
pub mod rule_parser;
pub mod shorthand;

use serde::{Deserialize, Serialize};

pub use ast::{AttrValue, Attributes, Forest, Node, Pattern, Template};
pub use markup::MarkupParser;
pub use rule_parser::RuleParser;
pub use shorthand::ShorthandParser;

/// Parser error. Only raised when a resource ceiling is exceeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The scanner made no progress for too long; never expected on real input.
    #[error("Internal error: parser exceeded {limit} iterations")]
    IterationLimit { limit: usize },

    #[error("Parse error: expansion exceeded {limit} nodes")]
    NodeLimit { limit: usize },

    #[error("Parse error: nesting exceeded depth {limit}")]
    DepthLimit { limit: usize },
}

/// Resource ceilings applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_iterations: usize,
    pub max_nodes: usize,
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            max_nodes: 100_000,
            max_depth: 512,
        }
    }
}

/// Heuristic used to reject verbose markup handed to the shorthand parser.
pub fn looks_like_markup(text: &str) -> bool {
    let text = text.trim();
    text.starts_with('<') && text.contains("</")
}
