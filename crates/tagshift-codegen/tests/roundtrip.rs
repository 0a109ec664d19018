//! Conversions in both directions must be stable: rendering, re-parsing and
//! rendering again yields the same text, and shorthand regenerated from
//! expanded markup re-parses to an equal forest.

use pretty_assertions::assert_eq;
use tagshift_codegen::{markup, shorthand, transform, Direction, Settings};
use tagshift_parser::{MarkupParser, ShorthandParser};

fn expand(source: &str) -> String {
    transform(source, Direction::Expand, &Settings::default()).unwrap()
}

fn collapse(source: &str) -> String {
    transform(source, Direction::Collapse, &Settings::default()).unwrap()
}

const SAMPLES: &[&str] = &[
    "div",
    "ul>li.item$*3>a[href=#]{Link $}",
    "div#page>(header>h1{Site})+(main>article*2>h2{Post $})+footer",
    "div>(header>nav)+footer",
    "dl>(dt{Term $}+dd{Definition $})*3",
    "form>input[type=text placeholder=\"Your name\" required]+button{Send}",
    "p{Intro}>b{bold}+i{italic}",
    "table>tr*2>td*3{Cell}",
    "svg:svg>svg:rect[width=10]*2",
    "li{Price: \\$5}*2",
    "p{braces \\{ok\\} and back\\\\slash}",
    "div.md\\:flex>span",
    "section>(div>p)+(div>p+span)",
    "div[title=\"a\\\"b'c\"]",
    "a[href=\"?x=1&y=2\" title=\"R&amp;D\"]",
    "p{}+span>{}",
];

// =========================================================================
// Idempotence
// =========================================================================

#[test]
fn test_markup_generation_is_idempotent() {
    for source in SAMPLES {
        let once = expand(source);
        let twice = markup::generate(&MarkupParser::parse(&once).unwrap(), &Settings::default());
        assert_eq!(once, twice, "markup drifted for {source}");
    }
}

#[test]
fn test_shorthand_generation_is_idempotent() {
    for source in SAMPLES {
        let once = collapse(&expand(source));
        let twice = shorthand::generate(&ShorthandParser::parse(&once).unwrap(), &Settings::default());
        assert_eq!(once, twice, "shorthand drifted for {source}");
    }
}

#[test]
fn test_regenerated_shorthand_parses_to_equal_forest() {
    for source in SAMPLES {
        let original = ShorthandParser::parse(source).unwrap();
        let regenerated = collapse(&expand(source));
        let reparsed = ShorthandParser::parse(&regenerated).unwrap();
        assert_eq!(original, reparsed, "{source} regenerated as {regenerated}");
    }
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_table_round_trip() {
    let html = expand("table>tr*2>td*3{Cell}");
    assert_eq!(
        html,
        "<table>\n  <tr>\n    <td>Cell</td>\n    <td>Cell</td>\n    <td>Cell</td>\n  </tr>\n  <tr>\n    <td>Cell</td>\n    <td>Cell</td>\n    <td>Cell</td>\n  </tr>\n</table>"
    );
    assert_eq!(collapse(&html), "table>tr*2>td*3{Cell}");
}

#[test]
fn test_fan_out_expansion() {
    assert_eq!(
        expand("div>(header>nav)+footer"),
        "<div>\n  <header>\n    <nav />\n  </header>\n  <footer />\n</div>"
    );
}

#[test]
fn test_numbered_navigation() {
    assert_eq!(
        expand("nav>ul>li*2>a[href=#]{Link $}"),
        "<nav>\n  <ul>\n    <li>\n      <a href=\"#\">Link 1</a>\n    </li>\n    <li>\n      <a href=\"#\">Link 2</a>\n    </li>\n  </ul>\n</nav>"
    );
}

#[test]
fn test_escaped_placeholder_survives_both_directions() {
    let html = expand("li{Price: \\$5}*2");
    assert_eq!(html, "<li>Price: $5</li>\n<li>Price: $5</li>");
    assert_eq!(collapse(&html), "li{Price: \\$5}*2");
}

#[test]
fn test_value_with_both_quotes_round_trips() {
    let html = expand("div[title=\"a\\\"b'c\"]");
    assert_eq!(html, "<div title=\"a&quot;b'c\" />");
    assert_eq!(collapse(&html), "div[title=\"a\\\"b'c\"]");
}

#[test]
fn test_grouping_inverse() {
    assert_eq!(collapse("<li></li><li></li>"), "li*2");
    assert_eq!(collapse("<div></div><div></div><span></span>"), "div*2+span");
}

#[test]
fn test_deeply_mixed_structure_round_trips() {
    let source = "section>(div>p)+(div>p+span)";
    let regenerated = collapse(&expand(source));
    assert_eq!(regenerated, "section>((div>p)+(div>(p+span)))");
}
