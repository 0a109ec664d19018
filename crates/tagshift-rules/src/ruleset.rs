//! Ordered collections of named rules.
//!
//! Enabled rules run in order, each on the previous rule's output. Disabled
//! rules are skipped entirely (they are not even compiled).

use serde::{Deserialize, Serialize};
use tagshift_parser::ast::{Forest, Node};

use crate::{Rule, RuleError};

/// A saved rule as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRule {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl NamedRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
            enabled: true,
        }
    }

    fn compile(&self) -> Result<Rule, RuleError> {
        Rule::compile(&self.pattern, &self.replacement).map_err(|e| RuleError::Invalid {
            name: self.name.clone(),
            source: Box::new(e),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<NamedRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSetOutcome {
    pub forest: Forest,
    /// Names of the rules that matched at least once, in application order.
    pub applied: Vec<String>,
    /// Total replaced runs across all rules.
    pub matches: usize,
}

impl RuleSet {
    pub fn new(rules: Vec<NamedRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &NamedRule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    /// Apply every enabled rule in order. All enabled rules are compiled before
    /// any is applied, so an invalid rule leaves nothing half-done.
    pub fn apply(&self, forest: &[Node]) -> Result<RuleSetOutcome, RuleError> {
        let compiled = self
            .enabled()
            .map(|r| r.compile().map(|rule| (r.name.as_str(), rule)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut current = forest.to_vec();
        let mut applied = Vec::new();
        let mut matches = 0;

        for (name, rule) in compiled {
            let rewrite = rule.rewrite(&current);
            log::info!(target: "tagshift.rules", "rule '{name}': {} match(es)", rewrite.matches);
            if rewrite.matches > 0 {
                applied.push(name.to_string());
            }
            matches += rewrite.matches;
            current = rewrite.forest;
        }

        Ok(RuleSetOutcome {
            forest: current,
            applied,
            matches,
        })
    }
}

impl FromIterator<NamedRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = NamedRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagshift_parser::MarkupParser;

    fn forest(markup: &str) -> Forest {
        MarkupParser::parse(markup).unwrap()
    }

    fn tags(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.tag.as_str()).collect()
    }

    #[test]
    fn test_empty_set_is_identity() {
        let input = forest("<a></a><b></b>");
        let set = RuleSet::default();
        assert!(set.is_empty());
        let outcome = set.apply(&input).unwrap();
        assert_eq!(outcome.forest, input);
        assert!(outcome.applied.is_empty());
    }

    #[test]
    fn test_rules_chain_in_order() {
        let set: RuleSet = vec![
            NamedRule::new("rename", "a", "b"),
            NamedRule::new("wrap", "X:b", "div>X"),
        ]
        .into_iter()
        .collect();

        let outcome = set.apply(&forest("<a></a>")).unwrap();
        assert_eq!(tags(&outcome.forest), vec!["div"]);
        assert_eq!(tags(&outcome.forest[0].children), vec!["b"]);
        assert_eq!(outcome.applied, vec!["rename", "wrap"]);
        assert_eq!(outcome.matches, 2);
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let mut disabled = NamedRule::new("broken", "", "");
        disabled.enabled = false;
        let set = RuleSet::new(vec![disabled, NamedRule::new("swap", "a+b", "b+a")]);

        let outcome = set.apply(&forest("<a></a><b></b>")).unwrap();
        assert_eq!(tags(&outcome.forest), vec!["b", "a"]);
        assert_eq!(set.enabled().count(), 1);
    }

    #[test]
    fn test_rules_without_matches_are_not_reported() {
        let set = RuleSet::new(vec![
            NamedRule::new("never", "table", "div"),
            NamedRule::new("swap", "a+b", "b+a"),
        ]);
        let outcome = set.apply(&forest("<a></a><b></b>")).unwrap();
        assert_eq!(outcome.applied, vec!["swap"]);
    }

    #[test]
    fn test_invalid_rule_names_itself() {
        let set = RuleSet::new(vec![NamedRule::new("bad", "A", "B")]);
        let err = set.apply(&forest("<a></a>")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Rule 'bad': Pattern error: replacement uses capture 'B' which the pattern does not bind"
        );
    }
}
