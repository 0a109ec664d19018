//! Table and list extraction.
//!
//! Pulls tabular data out of `table` elements and item trees out of `ul` /
//! `ol` lists. Tag names match case-insensitively. Cells and items contribute
//! their direct text only.

use serde::Serialize;
use tagshift_parser::ast::Node;

/// Everything extracted from one forest, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub tables: Vec<Table>,
    pub lists: Vec<List>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListKind {
    #[serde(rename = "ul")]
    Unordered,
    #[serde(rename = "ol")]
    Ordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    #[serde(rename = "type")]
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub text: String,
    /// Lists found inside this item.
    pub nested: Vec<List>,
}

pub fn extract(forest: &[Node]) -> Extraction {
    Extraction {
        tables: tables(forest),
        lists: lists(forest),
    }
}

// =========================================================================
// Tables
// =========================================================================

/// Every `table` at any depth, including tables nested in cells.
pub fn tables(forest: &[Node]) -> Vec<Table> {
    let mut found = Vec::new();
    collect_tables(forest, &mut found);
    found
}

fn collect_tables(nodes: &[Node], found: &mut Vec<Table>) {
    for node in nodes {
        if is(node, "table") {
            found.push(parse_table(node));
        }
        collect_tables(&node.children, found);
    }
}

/// Rows inside `thead`, or rows holding a `th`, are the header (the last one
/// wins). Without any, the first data row becomes the header.
fn parse_table(table: &Node) -> Table {
    let mut result = Table::default();
    collect_rows(&table.children, false, &mut result);

    if result.headers.is_empty() && !result.rows.is_empty() {
        result.headers = result.rows.remove(0);
    }
    result
}

fn collect_rows(nodes: &[Node], in_head: bool, table: &mut Table) {
    for node in nodes {
        if is(node, "thead") {
            collect_rows(&node.children, true, table);
        } else if is(node, "tbody") || is(node, "tfoot") {
            collect_rows(&node.children, false, table);
        } else if is(node, "tr") {
            let row: Vec<String> = node
                .children
                .iter()
                .filter(|cell| is(cell, "th") || is(cell, "td"))
                .map(|cell| cell.text.clone().unwrap_or_default())
                .collect();

            if in_head || node.children.iter().any(|cell| is(cell, "th")) {
                table.headers = row;
            } else {
                table.rows.push(row);
            }
        }
    }
}

// =========================================================================
// Lists
// =========================================================================

/// Outermost `ul` / `ol` lists at any depth. Lists inside an item are reported
/// as that item's `nested` lists rather than again at the top level.
pub fn lists(forest: &[Node]) -> Vec<List> {
    let mut found = Vec::new();
    collect_lists(forest, &mut found);
    found
}

fn collect_lists(nodes: &[Node], found: &mut Vec<List>) {
    for node in nodes {
        match list_kind(node) {
            Some(kind) => found.push(List {
                kind,
                items: node
                    .children
                    .iter()
                    .filter(|child| is(child, "li"))
                    .map(|li| ListItem {
                        text: li.text.clone().unwrap_or_default(),
                        nested: lists(&li.children),
                    })
                    .collect(),
            }),
            None => collect_lists(&node.children, found),
        }
    }
}

fn list_kind(node: &Node) -> Option<ListKind> {
    if is(node, "ul") {
        Some(ListKind::Unordered)
    } else if is(node, "ol") {
        Some(ListKind::Ordered)
    } else {
        None
    }
}

fn is(node: &Node, tag: &str) -> bool {
    node.tag.eq_ignore_ascii_case(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagshift_parser::{MarkupParser, ShorthandParser};

    fn from_markup(source: &str) -> Extraction {
        extract(&MarkupParser::parse(source).unwrap())
    }

    fn from_shorthand(source: &str) -> Extraction {
        extract(&ShorthandParser::parse(source).unwrap())
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Tables
    // =========================================================================

    #[test]
    fn test_headers_from_thead() {
        let tables = from_markup(
            "<table><thead><tr><td>Name</td><td>Age</td></tr></thead>\
             <tbody><tr><td>Ann</td><td>31</td></tr><tr><td>Bob</td><td>27</td></tr></tbody></table>",
        )
        .tables;
        assert_eq!(
            tables,
            vec![Table {
                headers: strings(&["Name", "Age"]),
                rows: vec![strings(&["Ann", "31"]), strings(&["Bob", "27"])],
            }]
        );
    }

    #[test]
    fn test_headers_from_row_with_th() {
        let tables = from_shorthand("table>(tr>th{A}+th{B})+(tr>td{1}+td{2})").tables;
        assert_eq!(tables[0].headers, strings(&["A", "B"]));
        assert_eq!(tables[0].rows, vec![strings(&["1", "2"])]);
    }

    #[test]
    fn test_first_row_is_header_without_th() {
        let tables = from_shorthand("table>tr*3>td{r$}").tables;
        assert_eq!(tables[0].headers, strings(&["r1"]));
        assert_eq!(tables[0].rows, vec![strings(&["r2"]), strings(&["r3"])]);
    }

    #[test]
    fn test_tfoot_rows_are_data() {
        let tables = from_markup(
            "<table><tr><th>Item</th></tr><tbody><tr><td>x</td></tr></tbody>\
             <tfoot><tr><td>total</td></tr></tfoot></table>",
        )
        .tables;
        assert_eq!(tables[0].rows, vec![strings(&["x"]), strings(&["total"])]);
    }

    #[test]
    fn test_non_cell_children_and_empty_cells() {
        let tables = from_markup("<table><caption>c</caption><tr><th>H</th><td></td><span>no</span></tr></table>").tables;
        assert_eq!(tables[0].headers, strings(&["H", ""]));
        assert!(tables[0].rows.is_empty());
    }

    #[test]
    fn test_nested_tables_are_found() {
        let tables = from_shorthand("div>table>tr>td>table>tr>td{inner}").tables;
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].headers, strings(&["inner"]));
    }

    #[test]
    fn test_uppercase_tags() {
        let tables = from_markup("<TABLE><TR><TH>H</TH></TR><TR><TD>v</TD></TR></TABLE>").tables;
        assert_eq!(tables[0].headers, strings(&["H"]));
        assert_eq!(tables[0].rows, vec![strings(&["v"])]);
    }

    // =========================================================================
    // Lists
    // =========================================================================

    #[test]
    fn test_simple_list() {
        let lists = from_shorthand("ol>li*2{Step $}").lists;
        assert_eq!(
            lists,
            vec![List {
                kind: ListKind::Ordered,
                items: vec![
                    ListItem {
                        text: "Step 1".into(),
                        nested: vec![],
                    },
                    ListItem {
                        text: "Step 2".into(),
                        nested: vec![],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_nested_lists_stay_with_their_item() {
        let lists = from_markup("<div><ul><li>Fruit<ol><li>Apple</li></ol></li><li>Veg</li></ul></div>").lists;
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].kind, ListKind::Unordered);
        assert_eq!(lists[0].items[0].text, "Fruit");
        assert_eq!(lists[0].items[0].nested[0].kind, ListKind::Ordered);
        assert_eq!(lists[0].items[0].nested[0].items[0].text, "Apple");
        assert!(lists[0].items[1].nested.is_empty());
    }

    #[test]
    fn test_sibling_lists_in_document_order() {
        let lists = from_shorthand("ul>li{a}^ol>li{b}").lists;
        let kinds: Vec<ListKind> = lists.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![ListKind::Unordered, ListKind::Ordered]);
    }

    #[test]
    fn test_serializes_with_type_names() {
        let json = serde_json::to_string(&from_shorthand("ul>li{x}")).unwrap();
        assert_eq!(
            json,
            r#"{"tables":[],"lists":[{"type":"ul","items":[{"text":"x","nested":[]}]}]}"#
        );
    }
}
