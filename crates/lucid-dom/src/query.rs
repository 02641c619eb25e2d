//! Queries and text helpers.

use crate::node::{Node, NodeId};
use crate::tree::Document;

impl Document {
    /// Find the attached element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root())
            .chain(self.descendants(self.root()))
            .find(|&n| self.element(n).and_then(|el| el.attr("id")) == Some(id))
    }

    /// Descendant elements of `scope` carrying `class`, in document order.
    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Direct element children of `id` carrying `class`.
    pub fn children_with_class(&self, id: NodeId, class: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Descendant elements of `scope` whose attribute `name` equals `value`.
    pub fn find_by_attr(&self, scope: NodeId, name: &str, value: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.element(n).and_then(|el| el.attr(name)) == Some(value))
            .collect()
    }

    /// First direct element child with tag `tag`.
    pub fn child_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&n| self.element(n).is_some_and(|el| el.tag == tag))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            el.add_class(class);
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        self.element_mut(id).is_some_and(|el| el.remove_class(class))
    }

    /// Class names of `id` in declaration order (empty for text nodes).
    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.element(id)
            .map(|el| el.classes().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_style(property, value);
        }
    }

    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_style(property);
        }
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in std::iter::once(id).chain(self.descendants(id)) {
            if let Some(Node::Text(text)) = self.get(n) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(Node::Text(existing)) = self.nodes.get_mut(id) {
            *existing = text.into();
            return;
        }
        if self.is_element(id) {
            self.clear_children(id);
            let node = self.create_text(text);
            self.append_child(id, node);
        }
    }
}
