//! Owned document tree.
//!
//! [`DomTree`] is the mutable representation every transformation works on.
//! Nodes are a closed set of variants so the cleaner and the table
//! partitioner match on them exhaustively.

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with its attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as produced by the parser
    pub tag: String,
    /// Attribute name/value pairs in source order
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

/// Position of a node as child indices walked from the root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

/// A parsed document: an optional doctype followed by top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomTree {
    /// Doctype name, e.g. `html` for `<!DOCTYPE html>`
    pub doctype: Option<String>,
    /// Top-level nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), attrs: Vec::new(), children: Vec::new() }
    }

    /// Adds an attribute, keeping insertion order.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Appends a child node.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Checks the tag name, ignoring ASCII case.
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Removes every attribute with the given name, returning whether any was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.attrs.len() != before
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Concatenation of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    /// Whether any descendant element has the given tag.
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.children.iter().any(|child| match child {
            Node::Element(el) => el.is(tag) || el.contains_tag(tag),
            Node::Text(_) | Node::Comment(_) => false,
        })
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) | Node::Comment(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl DomTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the node at `path`.
    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        let (last, parents) = path.0.split_last()?;
        let mut siblings = &self.children;
        for &index in parents {
            match siblings.get(index)? {
                Node::Element(el) => siblings = &el.children,
                Node::Text(_) | Node::Comment(_) => return None,
            }
        }
        siblings.get(*last)
    }

    /// Detaches the node at `path` and returns it.
    ///
    /// Later siblings shift one index to the left; paths that precede
    /// `path` in document order stay valid.
    pub fn detach(&mut self, path: &NodePath) -> Option<Node> {
        let (last, parents) = path.0.split_last()?;
        let mut siblings = &mut self.children;
        for &index in parents {
            match siblings.get_mut(index)? {
                Node::Element(el) => siblings = &mut el.children,
                Node::Text(_) | Node::Comment(_) => return None,
            }
        }
        (*last < siblings.len()).then(|| siblings.remove(*last))
    }

    /// Visits every element depth-first in document order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.children, &mut out);
        out
    }

    /// Number of elements in the tree.
    pub fn element_count(&self) -> usize {
        self.elements().len()
    }

    /// Concatenation of all text nodes in the tree.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    /// Whether the tree has any element with the given tag.
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.elements().iter().any(|el| el.is(tag))
    }
}

/// Appends text to `nodes`, merging it into a trailing text node.
pub(crate) fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    match nodes.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => nodes.push(Node::Text(text.to_string())),
    }
}

/// Appends a node to `nodes`, merging adjacent text.
pub(crate) fn push_node(nodes: &mut Vec<Node>, node: Node) {
    match node {
        Node::Text(text) => push_text(nodes, &text),
        other => nodes.push(other),
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(el) => collect_text(&el.children, out),
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) => {}
        }
    }
}

fn collect_elements<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node {
            out.push(el);
            collect_elements(&el.children, out);
        }
    }
}
