//! tagshift Code Generator
//!
//! Renders a `Node` forest in either notation and wires parsers to
//! generators for the two conversion directions.
//!
//! ```text
//! shorthand ─ ShorthandParser ─┐            ┌─ markup::generate ─── verbose markup
//!                              ├─ Forest ───┤
//! markup ──── MarkupParser ────┘            └─ shorthand::generate ─ shorthand
//! ```
//!
//! # Example
//!
//! ```
//! use tagshift_codegen::{transform, Direction, Settings};
//!
//! let html = transform("ul>li*2", Direction::Expand, &Settings::default()).unwrap();
//! assert_eq!(html, "<ul>\n  <li />\n  <li />\n</ul>");
//! ```

pub mod extract;
pub mod markup;
pub mod shorthand;
pub mod stats;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tagshift_parser::{Limits, MarkupParser, ParseError, ShorthandParser};

/// Output switches shared by both generators.
///
/// Field names accept both `snake_case` (configuration files) and
/// `camelCase` (JavaScript callers). Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Literal indent unit for verbose output.
    pub indent: String,
    #[serde(alias = "selfClosing")]
    pub self_closing: bool,
    /// Emit text content.
    #[serde(alias = "showValues")]
    pub show_values: bool,
    /// Emit id, classes and attributes at all.
    #[serde(alias = "showAttributes")]
    pub show_attributes: bool,
    /// Emit attribute values (otherwise names only).
    #[serde(alias = "showAttrValues")]
    pub show_attr_values: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            self_closing: true,
            show_values: true,
            show_attributes: true,
            show_attr_values: true,
        }
    }
}

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Shorthand → verbose markup.
    Expand,
    /// Verbose markup → shorthand.
    Collapse,
}

impl Direction {
    /// Guess the direction from the input itself: markup starts with `<`.
    pub fn detect(input: &str) -> Self {
        if input.trim_start().starts_with('<') {
            Direction::Collapse
        } else {
            Direction::Expand
        }
    }
}

impl FromStr for Direction {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expand" => Ok(Direction::Expand),
            "collapse" => Ok(Direction::Collapse),
            other => Err(CodegenError::UnknownDirection(other.to_string())),
        }
    }
}

/// Conversion error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unknown direction '{0}' (expected \"expand\" or \"collapse\")")]
    UnknownDirection(String),
}

/// Convert `input` in the given direction with default parser limits.
pub fn transform(input: &str, direction: Direction, settings: &Settings) -> Result<String, CodegenError> {
    transform_with_limits(input, direction, settings, Limits::default())
}

/// Convert `input` in the given direction.
pub fn transform_with_limits(
    input: &str,
    direction: Direction,
    settings: &Settings,
    limits: Limits,
) -> Result<String, CodegenError> {
    log::debug!(target: "tagshift.codegen", "transform {direction:?}, {} bytes", input.len());

    let output = match direction {
        Direction::Expand => {
            let forest = ShorthandParser::parse_with_limits(input, limits)?;
            markup::generate(&forest, settings)
        }
        Direction::Collapse => {
            let forest = MarkupParser::parse_with_limits(input, limits)?;
            shorthand::generate(&forest, settings)
        }
    };

    Ok(output)
}
