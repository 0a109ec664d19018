//! tagshift Rules
//!
//! Structural search/replace over markup forests. A rule pairs a search
//! pattern (consecutive siblings) with a replacement template:
//!
//! ```text
//! pattern      A:h2 + B:p          capture an <h2> followed by a <p>
//! replacement  section.post>A+B    wrap the heading, keep the paragraph after it
//! ```
//!
//! # Example
//!
//! ```
//! let out = tagshift_rules::apply_rule("<x><a></a><b></b></x>", "a+b", "b+a").unwrap();
//! assert_eq!(out, "x>(b+a)");
//! ```

mod engine;
pub mod ruleset;

use tagshift_codegen::{shorthand, Settings};
use tagshift_parser::ast::{Forest, Node, Pattern, PatternElement, Template};
use tagshift_parser::{MarkupParser, ParseError, RuleParser};

pub use ruleset::{NamedRule, RuleSet, RuleSetOutcome};

/// Rule error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The pattern or replacement is unusable.
    #[error("Pattern error: {0}")]
    Pattern(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A named rule from a rule set failed to compile.
    #[error("Rule '{name}': {source}")]
    Invalid {
        name: String,
        source: Box<RuleError>,
    },
}

/// A compiled rule, reusable across forests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pattern: Pattern,
    template: Template,
}

/// The result of applying a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub forest: Forest,
    /// Number of sibling runs that were replaced.
    pub matches: usize,
}

impl Rule {
    /// Parse and validate a pattern / replacement pair.
    ///
    /// Fails when either side has no elements, or when the replacement refers
    /// to a capture the pattern never binds.
    pub fn compile(pattern: &str, replacement: &str) -> Result<Rule, RuleError> {
        let pattern = RuleParser::parse_pattern(pattern);
        if pattern.elements.is_empty() {
            return Err(RuleError::Pattern("search pattern has no elements".into()));
        }

        let template = RuleParser::parse_template(replacement);
        if template.nodes.is_empty() {
            return Err(RuleError::Pattern("replacement has no elements".into()));
        }

        let bound: Vec<&str> = pattern
            .elements
            .iter()
            .filter_map(|e| match e {
                PatternElement::Variable { name, .. } => Some(name.as_str()),
                PatternElement::Literal { .. } => None,
            })
            .collect();

        for name in template.nodes.iter().flat_map(|n| n.variable_names()) {
            if !bound.contains(&name) {
                return Err(RuleError::Pattern(format!(
                    "replacement uses capture '{name}' which the pattern does not bind"
                )));
            }
        }

        Ok(Rule { pattern, template })
    }

    /// Apply the rule at every depth of `forest`, returning a new forest.
    pub fn rewrite(&self, forest: &[Node]) -> Rewrite {
        let mut matches = 0;
        let forest = engine::rewrite_siblings(forest, &self.pattern, &self.template.nodes, &mut matches);
        log::debug!(target: "tagshift.rules", "rule replaced {matches} run(s)");
        Rewrite { forest, matches }
    }
}

/// Parse `markup`, apply one rule, and render the result as shorthand.
pub fn apply_rule(markup: &str, pattern: &str, replacement: &str) -> Result<String, RuleError> {
    let rule = Rule::compile(pattern, replacement)?;
    let forest = MarkupParser::parse(markup)?;
    let rewrite = rule.rewrite(&forest);
    Ok(shorthand::generate(&rewrite.forest, &Settings::default()))
}
