//! Abstract Syntax Tree for tagshift.
//!
//! Contains the markup-level node model shared by both parsers and both
//! generators, and the rule-level pattern/template types consumed by the
//! rule engine.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Markup-level AST
// ---------------------------------------------------------------------------

/// Tag used when an element is written with modifiers only (`.card`, `#main`).
pub const DEFAULT_TAG: &str = "div";

/// An ordered sequence of root-level nodes.
pub type Forest = Vec<Node>;

/// One markup element. Children are exclusively owned; the forest is a strict tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Node {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// The `prefix` of a `prefix:local` tag, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.tag.split_once(':').map(|(ns, _)| ns)
    }

    /// The tag without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.tag.split_once(':').map_or(self.tag.as_str(), |(_, local)| local)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// An attribute value: either a string or a valueless flag (`disabled`).
///
/// Serializes as the string, or as `true` for a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Flag,
}

/// Attributes in insertion order. Re-inserting a name replaces its value in place.
///
/// Serializes as a map, keeping insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, AttrValue)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Text(s) => serializer.serialize_str(s),
            AttrValue::Flag => serializer.serialize_bool(true),
        }
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, AttrValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, AttrValue)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

// ---------------------------------------------------------------------------
// Rule-level AST
// ---------------------------------------------------------------------------

/// A namespace requirement or rewrite written as `ns:` (or `:` for "none").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    /// `:Key`, no namespace prefix.
    Absent,
    /// `ns:Key`
    Prefix(String),
}

impl Namespace {
    /// Whether a node's namespace satisfies this requirement.
    pub fn admits(&self, namespace: Option<&str>) -> bool {
        match self {
            Namespace::Absent => namespace.is_none(),
            Namespace::Prefix(p) => namespace == Some(p.as_str()),
        }
    }
}

/// One token of a search pattern such as `svg:X:rect.icon`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternElement {
    /// Lowercase key: the node's tag must equal `tag` exactly.
    Literal {
        tag: String,
        required_id: Option<String>,
        required_classes: Vec<String>,
    },
    /// Uppercase key: binds whatever node matches the constraints.
    Variable {
        name: String,
        tag_constraint: Option<String>,
        namespace_constraint: Option<Namespace>,
        required_id: Option<String>,
        required_classes: Vec<String>,
    },
}

impl PatternElement {
    pub fn required_classes(&self) -> &[String] {
        match self {
            PatternElement::Literal {
                required_classes, ..
            }
            | PatternElement::Variable {
                required_classes, ..
            } => required_classes,
        }
    }
}

/// A parsed search pattern: consecutive sibling elements, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
}

/// What a replacement token produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateKind {
    /// Uppercase key: a deep clone of the capture, optionally modified.
    VariableRef {
        name: String,
        rename_local: Option<String>,
        rename_namespace: Option<Namespace>,
    },
    /// Lowercase key: a brand-new element.
    NewLiteral { tag: String },
}

/// One node of a replacement template, built bottom-up from a `>` chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNode {
    pub kind: TemplateKind,
    pub add_id: Option<String>,
    pub add_classes: Vec<String>,
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    /// Capture names referenced anywhere in this subtree.
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        if let TemplateKind::VariableRef { name, .. } = &self.kind {
            names.push(name);
        }
        for child in &self.children {
            child.collect_names(names);
        }
    }
}

/// A parsed replacement: top-level siblings, each possibly nested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub nodes: Vec<TemplateNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_split() {
        let node = Node::new("svg:rect");
        assert_eq!(node.namespace(), Some("svg"));
        assert_eq!(node.local_name(), "rect");

        let plain = Node::new("div");
        assert_eq!(plain.namespace(), None);
        assert_eq!(plain.local_name(), "div");
    }

    #[test]
    fn test_attributes_keep_insertion_order() {
        let mut attrs = Attributes::new();
        attrs.insert("b", AttrValue::Text("1".into()));
        attrs.insert("a", AttrValue::Flag);
        attrs.insert("b", AttrValue::Text("2".into()));

        let names: Vec<&str> = attrs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(attrs.get("b"), Some(&AttrValue::Text("2".into())));
    }

    #[test]
    fn test_node_serializes_as_plain_json() {
        let mut node = Node::new("input");
        node.id = Some("q".into());
        node.attributes.insert("type", AttrValue::Text("text".into()));
        node.attributes.insert("required", AttrValue::Flag);

        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"tag":"input","id":"q","classes":[],"attributes":{"type":"text","required":true},"children":[]}"#
        );
    }

    #[test]
    fn test_namespace_admits() {
        assert!(Namespace::Absent.admits(None));
        assert!(!Namespace::Absent.admits(Some("svg")));
        assert!(Namespace::Prefix("svg".into()).admits(Some("svg")));
        assert!(!Namespace::Prefix("svg".into()).admits(None));
    }
}
