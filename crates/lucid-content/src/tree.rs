//! Content tree arena.
//!
//! Nodes of one source document are stored in a flat `Vec` with parent and
//! children relationships tracked by indices. A tree with several roots is
//! the content forest of that document.
//!
//! Lookups walk the roots in pre-order, so the first node carrying an id
//! wins when a document repeats one.

use lucid_blocks::{ResourceId, is_prefix};
use serde::Serialize;

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Top of one tree (a book, a top-level menu node, a top-level template section).
    Root,
    /// Nested container.
    Section,
    /// Node that never has children.
    Leaf,
}

/// One entry of a content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    pub kind: NodeKind,
    /// Segment name, unique among siblings.
    pub name: String,
    pub id: ResourceId,
    pub title: String,
    /// Markup shown as the node's body, if the node has one.
    pub body: Option<String>,
    /// Explicit link target (menu leaves).
    pub link: Option<ResourceId>,
    /// Template URL (template entries).
    pub template: Option<String>,
}

impl ContentNode {
    pub fn new(kind: NodeKind, name: impl Into<String>, id: ResourceId) -> Self {
        Self {
            kind,
            name: name.into(),
            id,
            title: String::new(),
            body: None,
            link: None,
            template: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: ResourceId) -> Self {
        self.link = Some(link);
        self
    }

    #[must_use]
    pub fn with_template(mut self, url: impl Into<String>) -> Self {
        self.template = Some(url.into());
        self
    }
}

/// A node of the pre-order flattened projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatEntry {
    pub id: String,
    pub title: String,
    pub kind: NodeKind,
    pub level: usize,
    /// Where a link to this node leads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Immutable content forest of one source document.
#[derive(Debug, Default)]
pub struct ContentTree {
    nodes: Vec<ContentNode>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
    roots: Vec<usize>,
}

impl ContentTree {
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not an index of this tree.
    #[must_use]
    pub fn node(&self, idx: usize) -> &ContentNode {
        &self.nodes[idx]
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&ContentNode> {
        self.nodes.get(idx)
    }

    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    #[must_use]
    pub fn children(&self, idx: usize) -> &[usize] {
        self.children.get(idx).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents.get(idx).copied().flatten()
    }

    /// All indices in pre-order, roots in document order.
    #[must_use]
    pub fn preorder(&self) -> Vec<usize> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            result.push(idx);
            stack.extend(self.children[idx].iter().rev().copied());
        }
        result
    }

    /// First node, in pre-order, whose id equals `id`.
    #[must_use]
    pub fn resolve(&self, id: &ResourceId) -> Option<usize> {
        self.preorder()
            .into_iter()
            .find(|&idx| &self.nodes[idx].id == id)
    }

    /// Like [`resolve`](Self::resolve), falling back to the first node whose
    /// explicit link equals `id`.
    #[must_use]
    pub fn resolve_target(&self, id: &ResourceId) -> Option<usize> {
        self.resolve(id).or_else(|| {
            self.preorder()
                .into_iter()
                .find(|&idx| self.nodes[idx].link.as_ref() == Some(id))
        })
    }

    /// Ancestors of `idx`, root first, excluding `idx`.
    #[must_use]
    pub fn ancestors(&self, idx: usize) -> Vec<usize> {
        let mut result = Vec::new();
        let mut current = self.parent(idx);
        while let Some(i) = current {
            result.push(i);
            current = self.parents[i];
        }
        result.reverse();
        result
    }

    fn path_indices(&self, idx: usize) -> Vec<usize> {
        let mut path = self.ancestors(idx);
        path.push(idx);
        path
    }

    /// Segment names from the root down to `idx`.
    #[must_use]
    pub fn path(&self, idx: usize) -> Vec<&str> {
        self.path_indices(idx)
            .into_iter()
            .map(|i| self.nodes[i].name.as_str())
            .collect()
    }

    /// Ids from the root down to `idx`.
    #[must_use]
    pub fn line(&self, idx: usize) -> Vec<&ResourceId> {
        self.path_indices(idx)
            .into_iter()
            .map(|i| &self.nodes[i].id)
            .collect()
    }

    /// Depth of `idx`; roots are level 1.
    #[must_use]
    pub fn level(&self, idx: usize) -> usize {
        self.ancestors(idx).len() + 1
    }

    /// Whether `ancestor` is `idx` or lies on its path.
    #[must_use]
    pub fn is_on_path(&self, ancestor: usize, idx: usize) -> bool {
        is_prefix(&self.line(ancestor), &self.line(idx))
    }

    /// First childless node in the subtree rooted at `idx`, in pre-order.
    ///
    /// A childless `idx` is its own first leaf.
    #[must_use]
    pub fn first_leaf(&self, idx: usize) -> Option<usize> {
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            if self.children[i].is_empty() {
                return Some(i);
            }
            stack.extend(self.children[i].iter().rev().copied());
        }
        None
    }

    /// Where a link to `idx` leads.
    ///
    /// A node with a body links to itself; a node with an explicit link
    /// links there; anything else links to its first leaf. `None` when that
    /// leaf is an empty root or section with nothing to show.
    #[must_use]
    pub fn link_target(&self, idx: usize) -> Option<&ResourceId> {
        let node = &self.nodes[idx];
        if node.body.is_some() {
            return Some(&node.id);
        }
        if let Some(link) = &node.link {
            return Some(link);
        }
        let leaf = &self.nodes[self.first_leaf(idx)?];
        match (&leaf.link, leaf.kind) {
            (Some(link), _) => Some(link),
            (None, NodeKind::Leaf) => Some(&leaf.id),
            (None, _) if leaf.body.is_some() => Some(&leaf.id),
            (None, _) => None,
        }
    }

    /// Pre-order flattened projection of the whole forest.
    #[must_use]
    pub fn flatten(&self) -> Vec<FlatEntry> {
        self.preorder()
            .into_iter()
            .map(|idx| {
                let node = &self.nodes[idx];
                FlatEntry {
                    id: node.id.to_string(),
                    title: node.title.clone(),
                    kind: node.kind,
                    level: self.level(idx),
                    link: self.link_target(idx).map(ToString::to_string),
                }
            })
            .collect()
    }
}

/// Builds a [`ContentTree`] node by node.
#[derive(Debug, Default)]
pub struct ContentTreeBuilder {
    nodes: Vec<ContentNode>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
    roots: Vec<usize>,
}

impl ContentTreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent` (or as a new root) and return its index.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not an index returned by this builder.
    pub fn add(&mut self, node: ContentNode, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.children.push(Vec::new());
        self.parents.push(parent);
        match parent {
            Some(p) => self.children[p].push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn build(self) -> ContentTree {
        ContentTree {
            nodes: self.nodes,
            children: self.children,
            parents: self.parents,
            roots: self.roots,
        }
    }
}
