//! Matching and template instantiation.
//!
//! A pattern matches a window of consecutive siblings element by element.
//! Matching is single-pass, leftmost-first and non-overlapping: a matched run
//! is replaced wholesale (its subtrees are not searched again), any other node
//! is kept and the search continues inside its children.

use std::collections::HashMap;

use tagshift_parser::ast::{Namespace, Node, Pattern, PatternElement, TemplateKind, TemplateNode};

/// A node bound to a capture name, with the classes its pattern element required.
#[derive(Debug, Clone, Copy)]
struct Capture<'a> {
    node: &'a Node,
    required_classes: &'a [String],
}

type Captures<'a> = HashMap<&'a str, Capture<'a>>;

/// Rewrite a sibling sequence, recursing into unmatched nodes.
pub(crate) fn rewrite_siblings(
    nodes: &[Node],
    pattern: &Pattern,
    template: &[TemplateNode],
    matches: &mut usize,
) -> Vec<Node> {
    let width = pattern.elements.len();
    let mut out = Vec::with_capacity(nodes.len());
    let mut i = 0;

    while i < nodes.len() {
        if width > 0 && i + width <= nodes.len() {
            if let Some(captures) = match_window(pattern, &nodes[i..i + width]) {
                log::trace!(
                    target: "tagshift.rules",
                    "match at sibling {i}: {}",
                    nodes[i..i + width]
                        .iter()
                        .map(|n| n.tag.as_str())
                        .collect::<Vec<_>>()
                        .join("+")
                );
                *matches += 1;
                out.extend(template.iter().filter_map(|t| instantiate(t, &captures)));
                i += width;
                continue;
            }
        }

        let node = &nodes[i];
        out.push(Node {
            tag: node.tag.clone(),
            id: node.id.clone(),
            classes: node.classes.clone(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            children: rewrite_siblings(&node.children, pattern, template, matches),
        });
        i += 1;
    }

    out
}

/// Test one window against the pattern, collecting captures.
fn match_window<'a>(pattern: &'a Pattern, window: &'a [Node]) -> Option<Captures<'a>> {
    let mut captures = Captures::new();

    for (element, node) in pattern.elements.iter().zip(window) {
        if !matches_element(element, node) {
            return None;
        }

        if let PatternElement::Variable { name, .. } = element {
            match captures.get(name.as_str()) {
                // Repeated name: the later sibling must equal the first
                Some(bound) if bound.node != node => return None,
                Some(_) => {}
                None => {
                    captures.insert(
                        name,
                        Capture {
                            node,
                            required_classes: element.required_classes(),
                        },
                    );
                }
            }
        }
    }

    Some(captures)
}

fn matches_element(element: &PatternElement, node: &Node) -> bool {
    let required_id = match element {
        PatternElement::Literal { tag, required_id, .. } => {
            if node.tag != *tag {
                return false;
            }
            required_id
        }
        PatternElement::Variable {
            tag_constraint,
            namespace_constraint,
            required_id,
            ..
        } => {
            if tag_constraint
                .as_deref()
                .is_some_and(|local| node.local_name() != local)
            {
                return false;
            }
            if namespace_constraint
                .as_ref()
                .is_some_and(|ns| !ns.admits(node.namespace()))
            {
                return false;
            }
            required_id
        }
    };

    required_id
        .as_deref()
        .is_none_or(|id| node.id.as_deref() == Some(id))
        && element.required_classes().iter().all(|c| node.has_class(c))
}

/// Build one template node (and its template children).
fn instantiate(template: &TemplateNode, captures: &Captures<'_>) -> Option<Node> {
    let mut node = match &template.kind {
        TemplateKind::VariableRef {
            name,
            rename_local,
            rename_namespace,
        } => {
            let Some(capture) = captures.get(name.as_str()) else {
                log::warn!(target: "tagshift.rules", "capture {name} is not bound");
                return None;
            };
            let mut node = capture.node.clone();

            // Classes used for matching go away unless re-added
            node.classes.retain(|c| {
                !capture.required_classes.contains(c) || template.add_classes.contains(c)
            });

            if rename_local.is_some() || rename_namespace.is_some() {
                node.tag = rename(&node, rename_local.as_deref(), rename_namespace.as_ref());
            }
            node
        }
        TemplateKind::NewLiteral { tag } => Node::new(tag.clone()),
    };

    if let Some(id) = &template.add_id {
        node.id = Some(id.clone());
    }
    for class in &template.add_classes {
        if !node.has_class(class) {
            node.classes.push(class.clone());
        }
    }
    node.children
        .extend(template.children.iter().filter_map(|t| instantiate(t, captures)));

    Some(node)
}

fn rename(node: &Node, local: Option<&str>, namespace: Option<&Namespace>) -> String {
    let local = local.unwrap_or(node.local_name());
    let namespace = match namespace {
        None => node.namespace(),
        Some(Namespace::Absent) => None,
        Some(Namespace::Prefix(ns)) => Some(ns.as_str()),
    };
    match namespace {
        Some(ns) => format!("{ns}:{local}"),
        None => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagshift_parser::{MarkupParser, RuleParser};

    fn rewrite(markup: &str, pattern: &str, replacement: &str) -> (Vec<Node>, usize) {
        let forest = MarkupParser::parse(markup).unwrap();
        let pattern = RuleParser::parse_pattern(pattern);
        let template = RuleParser::parse_template(replacement);
        let mut matches = 0;
        let out = rewrite_siblings(&forest, &pattern, &template.nodes, &mut matches);
        (out, matches)
    }

    fn tags(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.tag.as_str()).collect()
    }

    // =========================================================================
    // Matching
    // =========================================================================

    #[test]
    fn test_literal_swap() {
        let (out, matches) = rewrite("<a></a><b></b>", "a+b", "b+a");
        assert_eq!(tags(&out), vec!["b", "a"]);
        assert_eq!(matches, 1);
    }

    #[test]
    fn test_no_match_keeps_forest() {
        let (out, matches) = rewrite("<a></a><c></c>", "a+b", "b+a");
        assert_eq!(tags(&out), vec!["a", "c"]);
        assert_eq!(matches, 0);
    }

    #[test]
    fn test_match_at_depth() {
        let (out, matches) = rewrite("<x><a/><b/></x>", "a+b", "b+a");
        assert_eq!(tags(&out), vec!["x"]);
        assert_eq!(tags(&out[0].children), vec!["b", "a"]);
        assert_eq!(matches, 1);
    }

    #[test]
    fn test_non_overlapping_leftmost() {
        let (out, matches) = rewrite("<p>1</p><p>2</p><p>3</p>", "X:p+Y:p", "Y+X");
        let texts: Vec<&str> = out.iter().filter_map(|n| n.text.as_deref()).collect();
        assert_eq!(texts, vec!["2", "1", "3"]);
        assert_eq!(matches, 1);
    }

    #[test]
    fn test_matched_run_is_not_searched_again() {
        let (out, matches) = rewrite("<a><a></a></a>", "A:a", "b>A");
        assert_eq!(matches, 1);
        assert_eq!(tags(&out), vec!["b"]);
        assert_eq!(tags(&out[0].children[0].children), vec!["a"]);
    }

    #[test]
    fn test_variable_captures_anything() {
        let (out, _) = rewrite("<h1>T</h1><p>B</p>", "A+B", "B+A");
        assert_eq!(tags(&out), vec!["p", "h1"]);
        assert_eq!(out[1].text.as_deref(), Some("T"));
    }

    #[test]
    fn test_id_and_class_requirements() {
        let (out, matches) = rewrite(
            "<div class=\"card\"></div><div id=\"main\"></div>",
            "X.card",
            "section>X",
        );
        assert_eq!(matches, 1);
        assert_eq!(tags(&out), vec!["section", "div"]);

        let (_, matches) = rewrite("<div id=\"main\"></div><div></div>", "div#main", "p");
        assert_eq!(matches, 1);
    }

    #[test]
    fn test_namespace_constraints() {
        let markup = "<svg:rect/><rect/>";
        let (out, matches) = rewrite(markup, "svg:X", "g>X");
        assert_eq!(matches, 1);
        assert_eq!(tags(&out), vec!["g", "rect"]);

        let (out, matches) = rewrite(markup, ":X:rect", "X:box");
        assert_eq!(matches, 1);
        assert_eq!(tags(&out), vec!["svg:rect", "box"]);
    }

    #[test]
    fn test_back_reference_requires_equal_nodes() {
        let (out, matches) = rewrite("<li>a</li><li>a</li><li>b</li><li>c</li>", "X+X", "X");
        assert_eq!(matches, 1);
        let texts: Vec<&str> = out.iter().filter_map(|n| n.text.as_deref()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    // =========================================================================
    // Templates
    // =========================================================================

    #[test]
    fn test_smart_diff_strips_required_classes() {
        let (out, _) = rewrite("<div class=\"old keep\"></div>", "X.old", "X.new");
        assert_eq!(out[0].classes, vec!["keep", "new"]);
    }

    #[test]
    fn test_smart_diff_keeps_readded_classes() {
        let (out, _) = rewrite("<div class=\"a b\"></div>", "X.a", "X.a");
        assert_eq!(out[0].classes, vec!["a", "b"]);
    }

    #[test]
    fn test_rename_local_and_namespace() {
        let (out, _) = rewrite("<svg:rect/>", "X:rect", "X:circle");
        assert_eq!(out[0].tag, "svg:circle");

        let (out, _) = rewrite("<svg:rect/>", "X", ":X");
        assert_eq!(out[0].tag, "rect");

        let (out, _) = rewrite("<rect/>", "X", "svg:X");
        assert_eq!(out[0].tag, "svg:rect");
    }

    #[test]
    fn test_add_id_and_classes() {
        let (out, _) = rewrite("<ul></ul>", "X", "X#nav.menu.menu");
        assert_eq!(out[0].id.as_deref(), Some("nav"));
        assert_eq!(out[0].classes, vec!["menu"]);
    }

    #[test]
    fn test_wrap_and_nest() {
        let (out, _) = rewrite("<h2>T</h2><p>B</p>", "A:h2+B:p", "section.post>A+B");
        assert_eq!(tags(&out), vec!["section", "p"]);
        assert_eq!(out[0].classes, vec!["post"]);
        assert_eq!(tags(&out[0].children), vec!["h2"]);
    }

    #[test]
    fn test_template_children_follow_existing_children() {
        let (out, _) = rewrite("<ul><li></li></ul>", "X:ul", "X>hr");
        assert_eq!(tags(&out[0].children), vec!["li", "hr"]);
    }

    #[test]
    fn test_capture_reused_as_independent_copies() {
        let (mut out, _) = rewrite("<b>x</b>", "X", "X+X");
        assert_eq!(out.len(), 2);
        out[0].text = Some("changed".into());
        assert_eq!(out[1].text.as_deref(), Some("x"));
    }

    #[test]
    fn test_new_literal() {
        let (out, _) = rewrite("<br/>", "br", "hr.sep");
        assert_eq!(out[0].tag, "hr");
        assert_eq!(out[0].classes, vec!["sep"]);
    }
}
