//! In-memory document model
//!
//! Elements live in an arena addressed by [`NodeId`]. Removed elements keep
//! their slot so stale ids held by components resolve to `None` instead of
//! aliasing a newer element.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::selector::Selector;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Visible window onto the document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
    /// Whether viewport-intersection detection is available
    pub supports_intersection: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            scroll_y: 0.0,
            supports_intersection: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    top: f64,
    height: f64,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            parent: None,
            children: Vec::new(),
            top: 0.0,
            height: 0.0,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed element tree plus the viewport it is displayed in
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    root: NodeId,
    body: NodeId,
    viewport: Viewport,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing `<html><body></body></html>`
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            viewport: Viewport::default(),
        };
        let root = doc.create_element("html");
        let body = doc.append_new(root, "body");
        doc.root = root;
        doc.body = body;
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Some(Element::new(tag)));
        NodeId(self.nodes.len() - 1)
    }

    /// Create an element and append it to `parent`
    pub fn append_new(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        self.insert_before(parent, node, None);
        node
    }

    /// Insert `child` under `parent` before `reference` (or at the end)
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.element(parent).is_none() || self.element(child).is_none() {
            return;
        }
        self.detach(child);
        if let Some(el) = self.element_mut(parent) {
            let position = reference
                .and_then(|r| el.children.iter().position(|c| *c == r))
                .unwrap_or(el.children.len());
            el.children.insert(position, child);
        }
        if let Some(el) = self.element_mut(child) {
            el.parent = Some(parent);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.element(node).and_then(|el| el.parent);
        if let Some(parent) = parent {
            if let Some(el) = self.element_mut(parent) {
                el.children.retain(|c| *c != node);
            }
        }
        if let Some(el) = self.element_mut(node) {
            el.parent = None;
        }
    }

    /// Remove `node` and its subtree from the document
    pub fn remove(&mut self, node: NodeId) {
        if node == self.root || node == self.body {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(el) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend(el.children);
            }
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).and_then(|el| el.parent)
    }

    /// Zero-based position among the parent's children
    pub fn child_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.element(parent)?.children.iter().position(|c| *c == node)
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).and_then(|el| el.children.first().copied())
    }

    /// Whether `node` is `ancestor` or lies beneath it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Elements under `scope` (exclusive) in document order
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .element(scope)
            .map(|el| el.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(el) = self.element(node) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_within(self.root, selector)
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub fn query_selector_all_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect())
    }

    pub fn query_selector_within(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        Ok(self
            .query_selector_all_within(scope, selector)?
            .into_iter()
            .next())
    }

    /// Nearest inclusive ancestor matching `selector`
    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        let mut current = Some(node);
        while let Some(n) = current {
            if selector.matches(self, n) {
                return Ok(Some(n));
            }
            current = self.parent(n);
        }
        Ok(None)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    pub fn attr(&self, node: NodeId, key: &str) -> Option<&str> {
        self.element(node).and_then(|el| el.attr(key))
    }

    pub fn set_attr(&mut self, node: NodeId, key: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.insert(key.to_string(), value.to_string());
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).map(|el| el.has_class(class)).unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    /// Flip `class`, returning whether it is now present
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node).and_then(|el| el.style(property))
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn text(&self, node: NodeId) -> &str {
        self.element(node).map(Element::text).unwrap_or("")
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element_mut(node) {
            el.text = text.to_string();
        }
    }

    pub fn value(&self, node: NodeId) -> &str {
        self.element(node).map(Element::value).unwrap_or("")
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.value = value.to_string();
        }
    }

    /// Clear the value of every field inside `form`
    pub fn reset_form(&mut self, form: NodeId) {
        for node in self.descendants(form) {
            if let Some(el) = self.element_mut(node) {
                if matches!(el.tag.as_str(), "input" | "textarea" | "select") {
                    el.value.clear();
                }
            }
        }
    }

    pub fn set_geometry(&mut self, node: NodeId, top: f64, height: f64) {
        if let Some(el) = self.element_mut(node) {
            el.top = top;
            el.height = height;
        }
    }

    /// Equivalent of `offsetTop`
    pub fn offset_top(&self, node: NodeId) -> f64 {
        self.element(node).map(Element::top).unwrap_or(0.0)
    }

    /// Equivalent of `offsetHeight`
    pub fn offset_height(&self, node: NodeId) -> f64 {
        self.element(node).map(Element::height).unwrap_or(0.0)
    }

    /// Bottom edge of the lowest element
    pub fn content_height(&self) -> f64 {
        self.nodes
            .iter()
            .flatten()
            .map(|el| el.top + el.height)
            .fold(0.0, f64::max)
    }

    /// Largest reachable scroll offset
    pub fn max_scroll(&self) -> f64 {
        (self.content_height() - self.viewport.height).max(0.0)
    }
}
