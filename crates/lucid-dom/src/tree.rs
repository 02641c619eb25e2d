//! Tree operations: create, attach, detach, replace, walk.

use slotmap::{SecondaryMap, SlotMap};

use crate::node::{Element, Node, NodeId};

const EMPTY_CHILDREN: &[NodeId] = &[];

/// A document backed by a slotmap arena.
///
/// Nodes may be detached (no parent, not reachable from the root) while a
/// handler assembles them; a detached node becomes part of the rendered page
/// only once it is attached under the root.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: NodeId,
    scroll_top: u32,
}

impl Document {
    /// Create a document holding an empty `body` root.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::Element(Element::new("body")));
        let mut children = SecondaryMap::new();
        children.insert(root, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            root,
            scroll_top: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        let old = self.root;
        self.detach(root);
        self.root = root;
        if old != root {
            self.remove(old);
        }
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert(Node::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(Node::Text(text.into()))
    }

    /// Insert a detached node.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = self.nodes.insert(node);
        self.children.insert(id, Vec::new());
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id)? {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id)? {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Whether the node still exists in the arena.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent.get(current) {
                Some(&p) => current = p,
                None => return false,
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map_or(EMPTY_CHILDREN, Vec::as_slice)
    }

    /// Element children only.
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// Ancestors nearest first, excluding `id`.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(&p) = self.parent.get(current) {
            result.push(p);
            current = p;
        }
        result
    }

    /// Pre-order descendants, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.contains(parent), "parent node does not exist");
        self.detach(child);
        self.parent.insert(child, parent);
        if let Some(kids) = self.children.get_mut(parent) {
            kids.push(child);
        }
    }

    /// Insert `node` as the sibling immediately before `reference`.
    ///
    /// Does nothing if `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.detach(node);
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if let Some(kids) = self.children.get_mut(parent) {
            let pos = kids.iter().position(|&c| c == reference).unwrap_or(kids.len());
            kids.insert(pos, node);
            self.parent.insert(node, parent);
        }
    }

    /// Put `new` where `old` is and delete `old` with its subtree.
    ///
    /// `new` may be a descendant of `old`; it is detached before `old` goes.
    /// When `old` is the root, `new` becomes the root.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        self.detach(new);
        if old == self.root {
            self.set_root(new);
            return;
        }
        self.insert_before(old, new);
        self.remove(old);
    }

    /// Unlink a node from its parent, keeping it in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent.remove(id)
            && let Some(siblings) = self.children.get_mut(parent)
        {
            siblings.retain(|&c| c != id);
        }
    }

    /// Delete a node and all its descendants.
    ///
    /// Removing the root only clears its children.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            self.clear_children(id);
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(kids) = self.children.remove(current) {
                stack.extend(kids);
            }
            self.parent.remove(current);
            self.nodes.remove(current);
        }
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let kids = self.children(id).to_vec();
        for kid in kids {
            self.remove(kid);
        }
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, value: u32) {
        self.scroll_top = value;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
