//! Shorthand generator.
//!
//! The inverse of the shorthand parser. Runs of structurally equal siblings
//! collapse into `atom*count`; children follow `>`.
//!
//! Parentheses are placed from the structure being rendered rather than from
//! the rendered text:
//! - a child list with more than one group is wrapped: `ul>(li+p)`
//! - in a sibling list with more than one group, every group that has
//!   children is wrapped: `(ul>li)+p`
//!
//! so that the output re-parses to an equal forest.

use crate::Settings;
use tagshift_parser::ast::{AttrValue, Node};
use tagshift_parser::placeholder::escape;

/// Render a forest as shorthand.
pub fn generate(forest: &[Node], settings: &Settings) -> String {
    generate_siblings(forest, settings)
}

/// A sibling sequence, `+`-joined.
fn generate_siblings(nodes: &[Node], settings: &Settings) -> String {
    let groups = group_runs(nodes);
    let wrap = groups.len() > 1;

    groups
        .iter()
        .map(|&(node, count)| {
            let part = generate_group(node, count, settings);
            if wrap && !node.children.is_empty() {
                format!("({part})")
            } else {
                part
            }
        })
        .collect::<Vec<_>>()
        .join("+")
}

/// One run of equal siblings: `atom*count>children`.
fn generate_group(node: &Node, count: usize, settings: &Settings) -> String {
    let mut out = atom(node, settings);

    if count > 1 {
        out.push_str(&format!("*{count}"));
    }

    if !node.children.is_empty() {
        let children = generate_siblings(&node.children, settings);
        if group_runs(&node.children).len() > 1 {
            out.push_str(&format!(">({children})"));
        } else {
            out.push('>');
            out.push_str(&children);
        }
    }

    out
}

/// `tag#id.class[attrs]{text}` for a single node.
fn atom(node: &Node, settings: &Settings) -> String {
    let mut out = node.tag.clone();

    if settings.show_attributes {
        if let Some(id) = &node.id {
            out.push('#');
            if settings.show_attr_values {
                out.push_str(&escape_ident(id));
            }
        }

        if !node.classes.is_empty() {
            if settings.show_attr_values {
                for class in &node.classes {
                    out.push('.');
                    out.push_str(&escape_ident(class));
                }
            } else {
                out.push('.');
            }
        }

        if !node.attributes.is_empty() {
            let attrs: Vec<String> = node
                .attributes
                .iter()
                .map(|(name, value)| match value {
                    AttrValue::Text(value) if settings.show_attr_values => {
                        format!("{name}=\"{}\"", escape(value, &['$', '"']))
                    }
                    _ => name.to_string(),
                })
                .collect();
            out.push_str(&format!("[{}]", attrs.join(" ")));
        }
    }

    if settings.show_values {
        if let Some(text) = node.text.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(&format!("{{{}}}", escape(text, &['$', '{', '}'])));
        }
    }

    out
}

/// Escape everything the shorthand identifier scanner would stop at or number.
fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for c in ident.chars() {
        if !(c.is_alphanumeric() || c == '-' || c == '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Maximal runs of structurally equal consecutive nodes.
fn group_runs(nodes: &[Node]) -> Vec<(&Node, usize)> {
    let mut groups: Vec<(&Node, usize)> = Vec::new();
    for node in nodes {
        match groups.last_mut() {
            Some((last, count)) if *last == node => *count += 1,
            _ => groups.push((node, 1)),
        }
    }
    groups
}
