//! Rendering trees and fragments back to HTML.
//!
//! Attributes come out in the order they were parsed and tag names keep the
//! case the parser gave them. Escaping follows the HTML fragment
//! serialization rules, so a parsed document round-trips to equivalent
//! markup.

use crate::dom::{DomTree, Element, Node};

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are written verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Serializes a whole document, doctype included.
pub fn serialize(tree: &DomTree) -> String {
    let mut output = String::new();
    if let Some(name) = &tree.doctype {
        output.push_str("<!DOCTYPE ");
        output.push_str(name);
        output.push('>');
    }
    write_nodes(&tree.children, false, &mut output);
    output
}

/// Serializes a single node as standalone markup.
pub fn serialize_node(node: &Node) -> String {
    let mut output = String::new();
    write_node(node, false, &mut output);
    output
}

/// Serializes an element including its own tags.
pub fn serialize_element(element: &Element) -> String {
    let mut output = String::new();
    write_element(element, &mut output);
    output
}

fn write_nodes(nodes: &[Node], raw_text: bool, output: &mut String) {
    for node in nodes {
        write_node(node, raw_text, output);
    }
}

fn write_node(node: &Node, raw_text: bool, output: &mut String) {
    match node {
        Node::Element(el) => write_element(el, output),
        Node::Text(text) if raw_text => output.push_str(text),
        Node::Text(text) => escape_text(text, output),
        Node::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
    }
}

fn write_element(el: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&el.tag);
    for (name, value) in &el.attrs {
        output.push(' ');
        output.push_str(name);
        output.push_str("=\"");
        escape_attribute(value, output);
        output.push('"');
    }
    output.push('>');

    let tag = el.tag.to_ascii_lowercase();
    if VOID_ELEMENTS.contains(&tag.as_str()) {
        return;
    }

    write_nodes(&el.children, RAW_TEXT_ELEMENTS.contains(&tag.as_str()), output);

    output.push_str("</");
    output.push_str(&el.tag);
    output.push('>');
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' => output.push_str("&quot;"),
            _ => output.push(c),
        }
    }
}
