//! Document statistics.
//!
//! Counts elements, classes and attributes in a forest. Maps are sorted so the
//! serialized report is deterministic.

use std::collections::BTreeMap;

use serde::Serialize;
use tagshift_parser::ast::Node;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_elements: usize,
    /// Element count per tag.
    pub elements: BTreeMap<String, usize>,
    pub classes: BTreeMap<String, usize>,
    /// Attribute count per name. `id` and `class` are counted here too.
    pub attributes: BTreeMap<String, usize>,
    /// Deepest nesting level; roots are at depth 1.
    pub max_depth: usize,
    /// Elements carrying non-empty text.
    pub text_nodes: usize,
}

pub fn analyze(forest: &[Node]) -> Statistics {
    let mut stats = Statistics::default();
    for node in forest {
        visit(node, 1, &mut stats);
    }
    stats
}

fn visit(node: &Node, depth: usize, stats: &mut Statistics) {
    stats.total_elements += 1;
    stats.max_depth = stats.max_depth.max(depth);
    *stats.elements.entry(node.tag.clone()).or_default() += 1;

    for class in &node.classes {
        *stats.classes.entry(class.clone()).or_default() += 1;
    }
    for (name, _) in node.attributes.iter() {
        *stats.attributes.entry(name.to_string()).or_default() += 1;
    }
    if node.id.is_some() {
        *stats.attributes.entry("id".to_string()).or_default() += 1;
    }
    if !node.classes.is_empty() {
        *stats.attributes.entry("class".to_string()).or_default() += 1;
    }
    if node.text.as_deref().is_some_and(|t| !t.is_empty()) {
        stats.text_nodes += 1;
    }

    for child in &node.children {
        visit(child, depth + 1, stats);
    }
}
