//! Verbose markup generator.
//!
//! Walks the forest and emits indented tag markup. Roots are separated by a
//! newline; there is no trailing newline.

use crate::Settings;
use tagshift_parser::ast::{AttrValue, Node};
use tagshift_parser::entity;

/// Render a forest as verbose markup.
pub fn generate(forest: &[Node], settings: &Settings) -> String {
    forest
        .iter()
        .map(|node| {
            let mut out = String::new();
            generate_node(node, settings, 0, &mut out);
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_node(node: &Node, settings: &Settings, depth: usize, out: &mut String) {
    let pad = settings.indent.repeat(depth);

    // Opening tag
    out.push_str(&pad);
    out.push('<');
    out.push_str(&node.tag);

    if settings.show_attributes {
        if let Some(id) = &node.id {
            push_attribute(out, "id", id, settings);
        }
        if !node.classes.is_empty() {
            push_attribute(out, "class", &node.classes.join(" "), settings);
        }
        for (name, value) in node.attributes.iter() {
            match value {
                AttrValue::Text(value) => push_attribute(out, name, value, settings),
                AttrValue::Flag => {
                    out.push(' ');
                    out.push_str(name);
                }
            }
        }
    }

    // Hidden text does not count as content
    let text = node
        .text
        .as_deref()
        .filter(|t| settings.show_values && !t.is_empty());

    if text.is_none() && node.children.is_empty() && settings.self_closing {
        out.push_str(" />");
        return;
    }

    out.push('>');

    if node.children.is_empty() {
        if let Some(text) = text {
            out.push_str(text);
        }
    } else {
        if let Some(text) = text {
            out.push('\n');
            out.push_str(&pad);
            out.push_str(&settings.indent);
            out.push_str(text);
        }
        out.push('\n');
        for child in &node.children {
            generate_node(child, settings, depth + 1, out);
            out.push('\n');
        }
        out.push_str(&pad);
    }

    // Closing tag
    out.push_str(&format!("</{}>", node.tag));
}

/// ` name="value"`, or single quotes when the value holds only double quotes.
/// `&` and the chosen quote are written as character references.
fn push_attribute(out: &mut String, name: &str, value: &str, settings: &Settings) {
    let value = if settings.show_attr_values { value } else { "" };
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };

    out.push(' ');
    out.push_str(name);
    out.push('=');
    out.push(quote);
    out.push_str(&entity::encode(value, quote));
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagshift_parser::ShorthandParser;

    fn gen(source: &str) -> String {
        gen_with(source, &Settings::default())
    }

    fn gen_with(source: &str, settings: &Settings) -> String {
        let forest = ShorthandParser::parse(source).unwrap();
        generate(&forest, settings)
    }

    // =========================================================================
    // Basic elements
    // =========================================================================

    #[test]
    fn test_empty_forest() {
        assert_eq!(generate(&[], &Settings::default()), "");
    }

    #[test]
    fn test_self_closing_element() {
        assert_eq!(gen("div"), "<div />");
    }

    #[test]
    fn test_self_closing_disabled() {
        let settings = Settings {
            self_closing: false,
            ..Settings::default()
        };
        assert_eq!(gen_with("div", &settings), "<div></div>");
    }

    #[test]
    fn test_inline_text() {
        assert_eq!(gen("p{Hello}"), "<p>Hello</p>");
    }

    #[test]
    fn test_roots_joined_by_newline() {
        assert_eq!(gen("h1{A}+p{B}"), "<h1>A</h1>\n<p>B</p>");
    }

    #[test]
    fn test_nested_children() {
        assert_eq!(
            gen("ul>li{One}+li{Two}"),
            "<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>"
        );
    }

    #[test]
    fn test_text_with_children() {
        assert_eq!(gen("p{Intro}>b{x}"), "<p>\n  Intro\n  <b>x</b>\n</p>");
    }

    #[test]
    fn test_custom_indent() {
        let settings = Settings {
            indent: "\t".into(),
            ..Settings::default()
        };
        assert_eq!(gen_with("div>p>span", &settings), "<div>\n\t<p>\n\t\t<span />\n\t</p>\n</div>");
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    #[test]
    fn test_attribute_order() {
        assert_eq!(
            gen("a#home.nav.active[href=/ target=_blank]{Home}"),
            "<a id=\"home\" class=\"nav active\" href=\"/\" target=\"_blank\">Home</a>"
        );
    }

    #[test]
    fn test_flag_attribute() {
        assert_eq!(gen("input[type=checkbox checked]"), "<input type=\"checkbox\" checked />");
    }

    #[test]
    fn test_value_with_double_quote_is_single_quoted() {
        assert_eq!(
            gen("div[title='say \"hi\"']"),
            "<div title='say \"hi\"' />"
        );
    }

    #[test]
    fn test_value_with_both_quotes_uses_references() {
        assert_eq!(
            gen("div[title=\"a\\\"b'c\"]"),
            "<div title=\"a&quot;b'c\" />"
        );
    }

    #[test]
    fn test_ampersand_in_value() {
        assert_eq!(gen("a[href=\"?x=1&y=2\"]"), "<a href=\"?x=1&amp;y=2\" />");
    }

    #[test]
    fn test_hide_attribute_values() {
        let settings = Settings {
            show_attr_values: false,
            ..Settings::default()
        };
        assert_eq!(
            gen_with("a#x.y[href=/ disabled]{T}", &settings),
            "<a id=\"\" class=\"\" href=\"\" disabled>T</a>"
        );
    }

    #[test]
    fn test_hide_attributes() {
        let settings = Settings {
            show_attributes: false,
            ..Settings::default()
        };
        assert_eq!(gen_with("a#x.y[href=/]{T}", &settings), "<a>T</a>");
    }

    // =========================================================================
    // Hidden values
    // =========================================================================

    #[test]
    fn test_hidden_text_makes_element_empty() {
        let settings = Settings {
            show_values: false,
            ..Settings::default()
        };
        assert_eq!(gen_with("p{Hello}", &settings), "<p />");

        let settings = Settings {
            show_values: false,
            self_closing: false,
            ..Settings::default()
        };
        assert_eq!(gen_with("p{Hello}", &settings), "<p></p>");
    }

    #[test]
    fn test_hidden_text_with_children() {
        let settings = Settings {
            show_values: false,
            ..Settings::default()
        };
        assert_eq!(gen_with("p{Intro}>b", &settings), "<p>\n  <b />\n</p>");
    }
}
