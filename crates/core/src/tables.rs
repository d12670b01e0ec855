//! Table location and partitioning.
//!
//! A table root is the outermost `<table>` on any path from the document
//! root. Tables nested in another table's cells travel with their outer
//! table and are never reported on their own.
//!
//! # Example
//!
//! ```rust
//! use declutter_core::{extract_tables, parse, serialize};
//!
//! let mut tree = parse("<p>Hi</p><table><tr><td>1</td></tr></table>").unwrap();
//! let tables = extract_tables(&mut tree);
//!
//! assert_eq!(serialize(&tree), "<p>Hi</p>");
//! assert_eq!(tables.to_html(), "<table><tr><td>1</td></tr></table>");
//! ```

use crate::dom::{DomTree, Element, Node, NodePath};
use crate::serialize::serialize_element;

/// Ordered collection of detached table subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableExtract {
    tables: Vec<Element>,
}

impl TableExtract {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables in order of first appearance.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.tables.iter()
    }

    /// Each table as standalone markup.
    pub fn fragments(&self) -> Vec<String> {
        self.tables.iter().map(serialize_element).collect()
    }

    /// All tables joined by newlines, ready to be written out.
    pub fn to_html(&self) -> String {
        self.fragments().join("\n")
    }
}

/// Whether an element starts a tabular structure.
pub fn is_table_root(el: &Element) -> bool {
    el.is("table")
}

/// Finds every table root in document order.
///
/// The walk does not descend into a table once it is found, so nested
/// tables are never yielded separately.
pub fn locate_tables(tree: &DomTree) -> Vec<NodePath> {
    let mut found = Vec::new();
    let mut prefix = Vec::new();
    walk(&tree.children, &mut prefix, &mut found);
    found
}

fn walk(nodes: &[Node], prefix: &mut Vec<usize>, found: &mut Vec<NodePath>) {
    for (index, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else {
            continue;
        };

        prefix.push(index);
        if is_table_root(el) {
            found.push(NodePath::new(prefix.clone()));
        } else {
            walk(&el.children, prefix, found);
        }
        prefix.pop();
    }
}

/// Deletes every table root from the tree, returning how many were removed.
///
/// Everything else keeps its place and order. A second call removes nothing.
pub fn remove_tables(tree: &mut DomTree) -> usize {
    let removed = partition(tree).len();
    tracing::debug!(removed, "removed tables");
    removed
}

/// Deletes every table root from the tree and returns the removed subtrees.
///
/// The tree is left exactly as [`remove_tables`] would leave it.
pub fn extract_tables(tree: &mut DomTree) -> TableExtract {
    let tables = partition(tree);
    tracing::debug!(extracted = tables.len(), "extracted tables");
    TableExtract { tables }
}

fn partition(tree: &mut DomTree) -> Vec<Element> {
    let paths = locate_tables(tree);

    // Detaching back to front keeps the remaining paths valid.
    let mut tables: Vec<Element> = paths
        .iter()
        .rev()
        .filter_map(|path| match tree.detach(path) {
            Some(Node::Element(el)) => Some(el),
            Some(Node::Text(_) | Node::Comment(_)) | None => None,
        })
        .collect();
    tables.reverse();
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, serialize};
    use rstest::rstest;

    const SCENARIO: &str = "<html><body><p>Hi</p><table><tr><td>1</td></tr></table></body></html>";

    #[test]
    fn test_remove_tables_keeps_content() {
        let mut tree = parse(SCENARIO).unwrap();
        assert_eq!(remove_tables(&mut tree), 1);

        let html = serialize(&tree);
        assert!(!html.contains("<table"));
        assert!(html.contains("<p>Hi</p>"));
    }

    #[test]
    fn test_extract_single_table() {
        let mut tree = parse(SCENARIO).unwrap();
        let tables = extract_tables(&mut tree);

        assert_eq!(tables.len(), 1);
        assert!(tables.fragments()[0].contains("<table><tr><td>1</td></tr></table>"));
        assert_eq!(serialize(&tree), "<html><body><p>Hi</p></body></html>");
    }

    #[test]
    fn test_no_tables() {
        let html = "<html><body><p>Hi</p><ul><li>x</li></ul></body></html>";
        let mut tree = parse(html).unwrap();
        let before = tree.clone();

        let tables = extract_tables(&mut tree);
        assert!(tables.is_empty());
        assert_eq!(tables.to_html(), "");
        assert_eq!(tree, before);
        assert_eq!(serialize(&tree), html);
    }

    #[test]
    fn test_nested_tables_are_not_double_counted() {
        let html = "<table id=\"outer\"><tr><td><table id=\"inner\"><tr><td>x</td></tr></table></td></tr></table>\
                    <div><table id=\"second\"><tr><td>y</td></tr></table></div>";
        let tree = parse(html).unwrap();
        let paths = locate_tables(&tree);
        assert_eq!(paths.len(), 2);

        let mut tree = tree;
        let tables = extract_tables(&mut tree);
        let ids: Vec<_> = tables.iter().map(|t| t.attr("id").unwrap()).collect();
        assert_eq!(ids, vec!["outer", "second"]);
        assert!(tables.fragments()[0].contains("id=\"inner\""));
        assert_eq!(serialize(&tree), "<div></div>");
    }

    #[test]
    fn test_extraction_preserves_document_order() {
        let html = "<div><table id=\"a\"></table><p>1</p></div><table id=\"b\"></table><section><div><table id=\"c\"></table></div></section>";
        let mut tree = parse(html).unwrap();
        let tables = extract_tables(&mut tree);
        let ids: Vec<_> = tables.iter().map(|t| t.attr("id").unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(serialize(&tree), "<div><p>1</p></div><section><div></div></section>");
    }

    #[test]
    fn test_table_without_rows_is_a_root() {
        let mut tree = parse("<p>a</p><table></table><p>b</p>").unwrap();
        let tables = extract_tables(&mut tree);
        assert_eq!(tables.to_html(), "<table></table>");
        assert_eq!(serialize(&tree), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_remove_tables_is_idempotent() {
        let mut tree = parse(SCENARIO).unwrap();
        remove_tables(&mut tree);
        let once = tree.clone();
        assert_eq!(remove_tables(&mut tree), 0);
        assert_eq!(tree, once);
    }

    #[rstest]
    #[case(SCENARIO)]
    #[case("<p>no tables</p>")]
    #[case("<table><tr><td><table><tr><td>n</td></tr></table></td></tr></table><table><caption>c</caption></table>")]
    #[case("<div><table><thead><tr><th>h</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table></div>text")]
    fn test_remove_matches_extract(#[case] html: &str) {
        let mut removed = parse(html).unwrap();
        let mut extracted = parse(html).unwrap();
        let roots = locate_tables(&removed).len();

        assert_eq!(remove_tables(&mut removed), roots);
        assert_eq!(extract_tables(&mut extracted).len(), roots);
        assert_eq!(removed, extracted);
    }

    #[test]
    fn test_fragment_matches_source_markup() {
        let table = r#"<table class="data" border="1"><thead><tr><th>Name</th></tr></thead><tbody><tr><td>A &amp; B</td></tr></tbody></table>"#;
        let html = format!("<h1>Report</h1>{table}<p>end</p>");
        let mut tree = parse(&html).unwrap();
        let tables = extract_tables(&mut tree);
        assert_eq!(tables.to_html(), table);
    }
}
