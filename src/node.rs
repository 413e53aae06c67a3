//! Renderable node tree
//!
//! Handlers, layouts and global components all produce [`Node`] values. The
//! navigator only ever replaces a mount point's contents with a whole tree, so
//! nodes are plain owned data with no identity or diffing.
//!
//! # Example
//!
//! ```
//! use spa_navigator::{h, Node};
//!
//! let link: Node = h("a")
//!     .attr("href", "/about")
//!     .data("link", "")
//!     .class("nav-link")
//!     .text("About")
//!     .into();
//!
//! assert_eq!(
//!     link.to_html(),
//!     r#"<a href="/about" data-link="" class="nav-link">About</a>"#
//! );
//! ```

use std::fmt;

/// Tags rendered without a closing tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A renderable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children
    Element(Element),
    /// A text node
    Text(String),
    /// Several nodes without a wrapper element
    Fragment(Vec<Node>),
}

/// An element node, built with [`h`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

/// Start building an element with the given tag
pub fn h(tag: impl Into<String>) -> Element {
    Element::new(tag)
}

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Set the `class` attribute
    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    /// Set the `id` attribute
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Set a `data-*` attribute
    pub fn data(self, key: &str, value: impl Into<String>) -> Self {
        self.attr(format!("data-{key}"), value)
    }

    /// Set or remove a boolean attribute
    pub fn flag(mut self, name: impl Into<String>, on: bool) -> Self {
        let name = name.into();
        if on {
            self.attr(name, "")
        } else {
            self.attrs.retain(|(n, _)| *n != name);
            self
        }
    }

    /// Append a child
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children; `None` entries of an `Option` are skipped
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Append a text child
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether an attribute is present
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Check whether the class list contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }
}

impl Node {
    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Group nodes without a wrapper
    pub fn fragment<I>(nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        Node::Fragment(nodes.into_iter().map(Into::into).collect())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Depth-first search for the first element satisfying `predicate`
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        match self {
            Node::Element(el) => {
                if predicate(el) {
                    return Some(el);
                }
                el.children.iter().find_map(|c| c.find(predicate))
            }
            Node::Fragment(nodes) => nodes.iter().find_map(|c| c.find(predicate)),
            Node::Text(_) => None,
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|el| el.get_attr("id") == Some(id))
    }

    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.find(&|el| el.has_class(class))
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Node::Fragment(nodes) => nodes.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Serialize to HTML
    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.write_str(&escape(text, false)),
            Node::Fragment(nodes) => nodes.iter().try_for_each(|n| write!(f, "{n}")),
            Node::Element(el) => {
                write!(f, "<{}", el.tag)?;
                for (name, value) in &el.attrs {
                    write!(f, " {}=\"{}\"", name, escape(value, true))?;
                }
                f.write_str(">")?;
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return Ok(());
                }
                el.children.iter().try_for_each(|c| write!(f, "{c}"))?;
                write!(f, "</{}>", el.tag)
            }
        }
    }
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// Lets slot functions return a bare element
impl From<Element> for Option<Node> {
    fn from(el: Element) -> Self {
        Some(Node::Element(el))
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}
