//! HTML parsing into a [`DomTree`].
//!
//! Parsing is delegated to html5ever through `scraper`, which recovers from
//! malformed markup the way browsers do. The HTML5 tree builder also invents
//! wrapper elements the author never wrote (`html`, `head`, `body`, and the
//! `tbody` between a `table` and its rows). Those are spliced back out so a
//! parsed document serializes to the markup it came from.
//!
//! # Example
//!
//! ```rust
//! use declutter_core::{parse, serialize};
//!
//! let tree = parse("<table><tr><td>1</td></tr></table>").unwrap();
//! assert_eq!(serialize(&tree), "<table><tr><td>1</td></tr></table>");
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use ego_tree::NodeRef;
use encoding_rs::{Encoding, WINDOWS_1252};
use regex::Regex;
use scraper::Html;

use crate::dom::{DomTree, Element, Node, push_node, push_text};
use crate::{DeclutterError, Result};

/// Elements html5ever synthesizes when the source omits them.
const IMPLIED_WRAPPERS: &[&str] = &["html", "head", "body", "tbody"];

/// Attribute placed on wrappers that are present in the source.
const SOURCE_MARKER: &str = "data-declutter-source";

/// How far into the document to look for a charset declaration.
const CHARSET_SNIFF_LIMIT: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).expect("META_CHARSET: hardcoded regex is valid")
});

/// Parses an HTML document into an owned tree.
///
/// Unclosed tags are closed and stray end tags dropped by the parser; the
/// recovery messages are logged at debug level.
///
/// # Errors
///
/// Returns [`DeclutterError::HtmlParseError`] when the input is empty or
/// whitespace only.
pub fn parse(raw_html: &str) -> Result<DomTree> {
    if raw_html.trim().is_empty() {
        return Err(DeclutterError::HtmlParseError("document is empty".to_string()));
    }

    let marked = mark_source_wrappers(raw_html)?;
    let html = Html::parse_document(&marked);

    for error in &html.errors {
        tracing::debug!(%error, "parser recovered from malformed markup");
    }

    let mut tree = DomTree::new();
    for child in html.tree.root().children() {
        if let scraper::Node::Doctype(doctype) = child.value() {
            tree.doctype = Some(doctype.name().to_string());
        } else {
            convert(child, &mut tree.children);
        }
    }

    tracing::debug!(elements = tree.element_count(), "parsed document");
    Ok(tree)
}

/// Tags every implied-wrapper start tag that appears in the source.
fn mark_source_wrappers(html: &str) -> Result<String> {
    let mut output = Vec::with_capacity(html.len() + 64);
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                if IMPLIED_WRAPPERS.contains(&el.tag_name().as_str()) {
                    el.set_attribute(SOURCE_MARKER, "")?;
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| DeclutterError::HtmlParseError(e.to_string()))?;
    rewriter.end().map_err(|e| DeclutterError::HtmlParseError(e.to_string()))?;

    String::from_utf8(output).map_err(|e| DeclutterError::HtmlParseError(e.to_string()))
}

/// Converts a scraper node into owned nodes appended to `out`.
fn convert(node: NodeRef<'_, scraper::Node>, out: &mut Vec<Node>) {
    match node.value() {
        scraper::Node::Element(element) => {
            let mut children = Vec::new();
            for child in node.children() {
                convert(child, &mut children);
            }

            let tag = element.name();
            if IMPLIED_WRAPPERS.contains(&tag) && element.attr(SOURCE_MARKER).is_none() {
                for child in children {
                    push_node(out, child);
                }
                return;
            }

            let attrs = element
                .attrs()
                .filter(|(name, _)| *name != SOURCE_MARKER)
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            out.push(Node::Element(Element { tag: tag.to_string(), attrs, children }));
        }
        scraper::Node::Text(text) => push_text(out, text),
        scraper::Node::Comment(comment) => out.push(Node::Comment(comment.to_string())),
        scraper::Node::Document | scraper::Node::Fragment => {
            for child in node.children() {
                convert(child, out);
            }
        }
        scraper::Node::Doctype(_) | scraper::Node::ProcessingInstruction(_) => {}
    }
}

/// Decodes raw file bytes into a string.
///
/// A byte order mark wins; otherwise valid UTF-8 is taken as is, then a
/// `<meta charset>` declaration near the top of the document is honoured,
/// and windows-1252 is the last resort.
///
/// # Errors
///
/// Returns [`DeclutterError::InvalidEncoding`] when the declared charset is
/// not a known encoding label.
pub fn decode_html(bytes: &[u8]) -> Result<Cow<'_, str>> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Ok(text);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(Cow::Borrowed(text));
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(CHARSET_SNIFF_LIMIT)]);
    let encoding = match META_CHARSET.captures(&head) {
        Some(caps) => {
            let label = &caps[1];
            Encoding::for_label(label.as_bytes()).ok_or_else(|| DeclutterError::InvalidEncoding(label.to_string()))?
        }
        None => WINDOWS_1252,
    };

    tracing::debug!(encoding = encoding.name(), "decoding non UTF-8 document");
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "document contained undecodable bytes");
    }
    Ok(text)
}
