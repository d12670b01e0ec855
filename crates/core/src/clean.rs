//! Rule-based cleanup of a parsed document.
//!
//! Removal predicates are collected in an [`ExclusionPolicy`] built from a
//! [`CleanConfig`]; [`clean`] applies them together with attribute stripping,
//! unwrapping and image-paragraph wrapping in one depth-first pass.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{DomTree, Element, Node, push_node};

static HIDDEN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").expect("HIDDEN_STYLE: hardcoded regex is valid")
});

static AD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[-_])(ads?|advert|advertisement|adsbygoogle|sponsor|sponsored|promo|banner)($|[-_])")
        .expect("AD_TOKEN: hardcoded regex is valid")
});

/// Tags removed with their content by default
const DEFAULT_REMOVE_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "canvas", "nav", "img"];

/// Elements the empty-element rule never removes
const EMPTY_EXEMPT: &[&str] = &[
    "html", "head", "body", "tr", "td", "th", "thead", "tbody", "tfoot", "colgroup", "textarea", "option",
];

/// Inline elements whose whitespace separates the words around them
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font", "i", "kbd", "mark", "q", "s",
    "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// Void elements are empty by definition and never removed for it
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Configuration for HTML cleaning
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// Tags removed together with their content
    pub remove_tags: Vec<String>,
    /// Whether to remove comments
    pub remove_comments: bool,
    /// Whether to remove elements hidden with inline styles or the `hidden` attribute
    pub remove_hidden: bool,
    /// Whether to remove elements whose id or class looks like an advertisement
    pub remove_ad_like: bool,
    /// Whether to remove tables that contain no text
    pub remove_empty_tables: bool,
    /// Whether to remove elements left without attributes, children or text
    pub remove_empty: bool,
    /// Attributes stripped from every element
    pub strip_attributes: Vec<String>,
    /// Tags replaced by their children
    pub unwrap_tags: Vec<String>,
    /// Whether to wrap paragraphs that contained images in a marker div
    pub wrap_image_paragraphs: bool,
    /// Class given to the marker div
    pub wrapper_class: String,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            remove_tags: DEFAULT_REMOVE_TAGS.iter().map(|t| t.to_string()).collect(),
            remove_comments: true,
            remove_hidden: true,
            remove_ad_like: true,
            remove_empty_tables: true,
            remove_empty: true,
            strip_attributes: vec!["lang".to_string()],
            unwrap_tags: vec!["span".to_string()],
            wrap_image_paragraphs: true,
            wrapper_class: "exercise".to_string(),
        }
    }
}

impl CleanConfig {
    /// Creates a new builder for CleanConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use declutter_core::CleanConfig;
    ///
    /// let config = CleanConfig::builder().keep_tag("img").unwrap_tag("font").build();
    /// assert!(!config.remove_tags.iter().any(|t| t == "img"));
    /// ```
    pub fn builder() -> CleanConfigBuilder {
        CleanConfigBuilder::new()
    }
}

/// Builder for CleanConfig.
pub struct CleanConfigBuilder {
    config: CleanConfig,
}

impl CleanConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: CleanConfig::default() }
    }

    /// Adds a tag to the removal set.
    pub fn remove_tag(mut self, tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        if !self.config.remove_tags.contains(&tag) {
            self.config.remove_tags.push(tag);
        }
        self
    }

    /// Takes a tag out of the removal set.
    pub fn keep_tag(mut self, tag: &str) -> Self {
        self.config.remove_tags.retain(|t| !t.eq_ignore_ascii_case(tag));
        self
    }

    /// Sets whether to remove comments.
    pub fn remove_comments(mut self, value: bool) -> Self {
        self.config.remove_comments = value;
        self
    }

    /// Sets whether to remove hidden elements.
    pub fn remove_hidden(mut self, value: bool) -> Self {
        self.config.remove_hidden = value;
        self
    }

    /// Sets whether to remove ad-like elements.
    pub fn remove_ad_like(mut self, value: bool) -> Self {
        self.config.remove_ad_like = value;
        self
    }

    /// Sets whether to remove tables without text.
    pub fn remove_empty_tables(mut self, value: bool) -> Self {
        self.config.remove_empty_tables = value;
        self
    }

    /// Sets whether to remove empty elements.
    pub fn remove_empty(mut self, value: bool) -> Self {
        self.config.remove_empty = value;
        self
    }

    /// Adds an attribute to strip.
    pub fn strip_attribute(mut self, name: &str) -> Self {
        self.config.strip_attributes.push(name.to_ascii_lowercase());
        self
    }

    /// Stops stripping an attribute.
    pub fn keep_attribute(mut self, name: &str) -> Self {
        self.config.strip_attributes.retain(|a| !a.eq_ignore_ascii_case(name));
        self
    }

    /// Adds a tag to unwrap.
    pub fn unwrap_tag(mut self, tag: &str) -> Self {
        self.config.unwrap_tags.push(tag.to_ascii_lowercase());
        self
    }

    /// Stops unwrapping a tag.
    pub fn keep_wrapper(mut self, tag: &str) -> Self {
        self.config.unwrap_tags.retain(|t| !t.eq_ignore_ascii_case(tag));
        self
    }

    /// Sets whether to wrap paragraphs that contained images.
    pub fn wrap_image_paragraphs(mut self, value: bool) -> Self {
        self.config.wrap_image_paragraphs = value;
        self
    }

    /// Sets the class of the marker div.
    pub fn wrapper_class(mut self, value: impl Into<String>) -> Self {
        self.config.wrapper_class = value.into();
        self
    }

    /// Builds the config.
    pub fn build(self) -> CleanConfig {
        self.config
    }
}

impl Default for CleanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A predicate deciding that an element is removed with its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// Tag name is in the set
    Tags(HashSet<String>),
    /// Inline style or `hidden` attribute hides the element
    Hidden,
    /// An id or class token names an advertisement slot
    AdLike,
    /// A table with no text anywhere inside
    EmptyTable,
    /// No attributes, no child elements and only whitespace text
    Empty,
}

impl Exclusion {
    /// Whether the predicate looks at the element after its children were cleaned.
    ///
    /// Content-based predicates run post-order so that one pass reaches a fixed point.
    pub fn after_children(&self) -> bool {
        matches!(self, Exclusion::EmptyTable | Exclusion::Empty)
    }

    /// Evaluates the predicate against a single element.
    pub fn matches(&self, el: &Element) -> bool {
        match self {
            Exclusion::Tags(tags) => tags.contains(&el.tag.to_ascii_lowercase()),
            Exclusion::Hidden => {
                el.attr("hidden").is_some() || el.attr("style").is_some_and(|style| HIDDEN_STYLE.is_match(style))
            }
            Exclusion::AdLike => {
                el.attr("id").is_some_and(|id| AD_TOKEN.is_match(id)) || el.classes().any(|c| AD_TOKEN.is_match(c))
            }
            Exclusion::EmptyTable => el.is("table") && el.text_content().trim().is_empty(),
            Exclusion::Empty => is_empty_element(el),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Exclusion::Tags(_) => "tag",
            Exclusion::Hidden => "hidden",
            Exclusion::AdLike => "ad-like",
            Exclusion::EmptyTable => "empty-table",
            Exclusion::Empty => "empty",
        }
    }
}

fn is_empty_element(el: &Element) -> bool {
    let tag = el.tag.to_ascii_lowercase();
    if VOID_ELEMENTS.contains(&tag.as_str()) || EMPTY_EXEMPT.contains(&tag.as_str()) || !el.attrs.is_empty() {
        return false;
    }
    el.children.iter().all(|child| match child {
        Node::Text(text) => text.trim().is_empty(),
        Node::Element(_) | Node::Comment(_) => false,
    })
}

/// The full rule set applied by [`clean`].
///
/// Built once from a [`CleanConfig`] and only read during traversal.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    exclusions: Vec<Exclusion>,
    remove_comments: bool,
    strip_attributes: Vec<String>,
    unwrap_tags: HashSet<String>,
    wrapper_class: Option<String>,
}

impl ExclusionPolicy {
    pub fn from_config(config: &CleanConfig) -> Self {
        let mut exclusions = Vec::new();
        if !config.remove_tags.is_empty() {
            exclusions.push(Exclusion::Tags(
                config.remove_tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            ));
        }
        if config.remove_hidden {
            exclusions.push(Exclusion::Hidden);
        }
        if config.remove_ad_like {
            exclusions.push(Exclusion::AdLike);
        }
        if config.remove_empty_tables {
            exclusions.push(Exclusion::EmptyTable);
        }
        if config.remove_empty {
            exclusions.push(Exclusion::Empty);
        }

        Self {
            exclusions,
            remove_comments: config.remove_comments,
            strip_attributes: config.strip_attributes.clone(),
            unwrap_tags: config.unwrap_tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            wrapper_class: config.wrap_image_paragraphs.then(|| config.wrapper_class.clone()),
        }
    }

    /// The removal predicates in evaluation order.
    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    fn excluded(&self, el: &Element, after_children: bool) -> Option<&Exclusion> {
        self.exclusions
            .iter()
            .filter(|rule| rule.after_children() == after_children)
            .find(|rule| rule.matches(el))
    }

    fn is_wrapper(&self, el: &Element) -> bool {
        self.wrapper_class
            .as_deref()
            .is_some_and(|class| el.is("div") && el.classes().any(|c| c == class))
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::from_config(&CleanConfig::default())
    }
}

/// Counts of what a cleaning pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub removed: usize,
    pub unwrapped: usize,
    pub wrapped: usize,
    pub comments: usize,
}

impl CleanStats {
    /// Whether the pass left the tree untouched, attribute stripping aside.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Cleans a tree in place according to `policy`.
///
/// The walk is depth-first. An element removed before its children are
/// visited takes its whole subtree with it. Running `clean` again on its own
/// output changes nothing.
pub fn clean(tree: &mut DomTree, policy: &ExclusionPolicy) -> CleanStats {
    let mut stats = CleanStats::default();
    let children = std::mem::take(&mut tree.children);
    tree.children = clean_nodes(children, false, policy, &mut stats);

    tracing::debug!(
        removed = stats.removed,
        unwrapped = stats.unwrapped,
        wrapped = stats.wrapped,
        comments = stats.comments,
        "cleaned document"
    );
    stats
}

fn clean_nodes(nodes: Vec<Node>, in_wrapper: bool, policy: &ExclusionPolicy, stats: &mut CleanStats) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(el) => {
                for cleaned in clean_element(el, in_wrapper, policy, stats) {
                    push_node(&mut out, cleaned);
                }
            }
            Node::Comment(_) if policy.remove_comments => stats.comments += 1,
            other => push_node(&mut out, other),
        }
    }
    out
}

fn clean_element(mut el: Element, in_wrapper: bool, policy: &ExclusionPolicy, stats: &mut CleanStats) -> Vec<Node> {
    if let Some(rule) = policy.excluded(&el, false) {
        tracing::debug!(tag = %el.tag, rule = rule.name(), "removed element");
        stats.removed += 1;
        return Vec::new();
    }

    for name in &policy.strip_attributes {
        el.remove_attr(name);
    }

    let wrap = policy.wrapper_class.is_some() && !in_wrapper && el.is("p") && el.contains_tag("img");
    let is_wrapper = policy.is_wrapper(&el);

    let children = std::mem::take(&mut el.children);
    el.children = clean_nodes(children, is_wrapper, policy, stats);

    let tag = el.tag.to_ascii_lowercase();
    let mut kept = if policy.unwrap_tags.contains(&tag) {
        stats.unwrapped += 1;
        el.children
    } else if let Some(rule) = policy.excluded(&el, true) {
        tracing::debug!(tag = %el.tag, rule = rule.name(), "removed element");
        stats.removed += 1;
        // An inline element holding only whitespace still separates words.
        if *rule == Exclusion::Empty && INLINE_ELEMENTS.contains(&tag.as_str()) && !el.children.is_empty() {
            vec![Node::text(" ")]
        } else {
            Vec::new()
        }
    } else {
        vec![Node::Element(el)]
    };

    if wrap && let Some(class) = &policy.wrapper_class {
        stats.wrapped += 1;
        let mut wrapper = Element::new("div").with_attr("class", class.as_str());
        for node in kept {
            push_node(&mut wrapper.children, node);
        }
        kept = vec![Node::Element(wrapper)];
    }

    kept
}
