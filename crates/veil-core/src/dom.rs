#![forbid(unsafe_code)]

//! Headless document model.
//!
//! A [`Document`] is an arena of elements addressed by copyable [`NodeId`]s.
//! Each element carries a tag name, attributes, an ordered class list, and
//! inline style properties. This is the surface the overlay widgets mutate:
//! class toggling, ARIA attributes, and inline opacity/display styles.
//!
//! # Invariants
//!
//! 1. The document element (`<html>`) is always node 0 and `<body>` is its
//!    first child.
//! 2. The tree is acyclic: `append_child` refuses to attach an ancestor
//!    beneath one of its descendants.
//! 3. A class name appears at most once in an element's class list.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown `NodeId` | Id from another document | Getters return `None`/`false`, setters no-op |
//! | Cyclic append | Ancestor appended to descendant | Ignored |
//! | Empty style value | `set_style(n, p, "")` | Property removed (DOM semantics) |

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

/// Document shared between the manager and its collaborators.
///
/// Single-threaded by construction; callers never hold a borrow across an
/// await point.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Identifier of an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: AHashMap<String, String>,
    classes: Vec<String>,
    style: AHashMap<String, String>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: AHashMap::new(),
            classes: Vec::new(),
            style: AHashMap::new(),
        }
    }
}

/// Simple element matcher used by tree queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Tag name, case-insensitive (`a`, `div`).
    Tag(String),
    /// Attribute presence (`[data-overlay]`).
    Attr(String),
    /// Attribute equality (`[data-popup="id"]`).
    AttrEquals(String, String),
    /// Attribute prefix (`[href^="/modal_"]`).
    AttrPrefix(String, String),
    /// Class membership (`.close`).
    Class(String),
    /// Every inner selector matches.
    All(Vec<Selector>),
    /// At least one inner selector matches.
    Any(Vec<Selector>),
}

impl Selector {
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    pub fn attr(name: impl Into<String>) -> Self {
        Self::Attr(name.into())
    }

    pub fn attr_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttrEquals(name.into(), value.into())
    }

    pub fn attr_prefix(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::AttrPrefix(name.into(), prefix.into())
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    fn matches(&self, el: &Element) -> bool {
        match self {
            Self::Tag(tag) => el.tag.eq_ignore_ascii_case(tag),
            Self::Attr(name) => el.attributes.contains_key(name),
            Self::AttrEquals(name, value) => el.attributes.get(name).is_some_and(|v| v == value),
            Self::AttrPrefix(name, prefix) => el
                .attributes
                .get(name)
                .is_some_and(|v| v.starts_with(prefix.as_str())),
            Self::Class(class) => el.classes.iter().any(|c| c == class),
            Self::All(inner) => inner.iter().all(|s| s.matches(el)),
            Self::Any(inner) => inner.iter().any(|s| s.matches(el)),
        }
    }
}

/// Arena-backed element tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    const ROOT: NodeId = NodeId(0);
    const BODY: NodeId = NodeId(1);

    /// Create a document holding `<html><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut html = Element::new("html");
        html.children.push(Self::BODY);
        let mut body = Element::new("body");
        body.parent = Some(Self::ROOT);
        Self {
            nodes: vec![html, body],
        }
    }

    /// Wrap the document for sharing with collaborators.
    #[must_use]
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    /// The `<html>` element.
    #[inline]
    pub const fn document_element(&self) -> NodeId {
        Self::ROOT
    }

    /// The `<body>` element.
    #[inline]
    pub const fn body(&self) -> NodeId {
        Self::BODY
    }

    /// Number of elements ever created.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document element and body exist from construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.index())
    }

    // --- Tree ---

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Element::new(tag));
        id
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    ///
    /// Appending a node beneath itself or one of its descendants is ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if self.contains(child, parent) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                parent = parent.index(),
                child = child.index(),
                "append_child would create a cycle; ignored"
            );
            return;
        }
        if let Some(old) = self.nodes[child.index()].parent.take()
            && let Some(old_parent) = self.node_mut(old)
        {
            old_parent.children.retain(|&c| c != child);
        }
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Preorder traversal of the subtree rooted at `root`, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // --- Queries ---

    /// Whether the element matches `selector`.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.node(id).is_some_and(|n| selector.matches(n))
    }

    /// All descendants of `root` matching `selector`, in document order.
    pub fn query_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.matches(id, selector))
            .collect()
    }

    /// First descendant of `root` matching `selector`.
    pub fn query(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.matches(id, selector))
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.matches(current, selector) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    // --- Attributes ---

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .and_then(|n| n.attributes.get(name))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.node(id).is_some_and(|n| n.attributes.contains_key(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.node_mut(id) {
            n.attributes.insert(name.to_owned(), value.into());
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(n) = self.node_mut(id) {
            n.attributes.remove(name);
        }
    }

    // --- Class list ---

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Add a class. Empty names and duplicates are ignored.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if class.is_empty() {
            return;
        }
        if let Some(n) = self.node_mut(id)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(n) = self.node_mut(id) {
            n.classes.retain(|c| c != class);
        }
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        self.node(id).map(|n| n.classes.as_slice()).unwrap_or(&[])
    }

    // --- Inline style ---

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.node(id)
            .and_then(|n| n.style.get(property))
            .map(String::as_str)
    }

    /// Set an inline style property. An empty value removes it.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(n) = self.node_mut(id) {
            if value.is_empty() {
                n.style.remove(property);
            } else {
                n.style.insert(property.to_owned(), value);
            }
        }
    }

    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        if let Some(n) = self.node_mut(id) {
            n.style.remove(property);
        }
    }
}
