//! Rendering projections of content nodes.
//!
//! Every view builds a new detached element in the target document and
//! tags it with `data-{family}-id` and `data-{family}-level`. Class names
//! are prefixed with the family (`book_`, `menu_`) so both families can
//! share a page.

use lucid_blocks::ResourceId;
use lucid_dom::{Document, DomError, NodeId};

use crate::tree::{ContentTree, NodeKind};

/// Class and attribute naming for one content family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Family {
    pub prefix: &'static str,
    root: &'static str,
    section: &'static str,
    leaf: &'static str,
}

impl Family {
    pub const BOOK: Self = Self {
        prefix: "book",
        root: "book",
        section: "section",
        leaf: "page",
    };

    pub const MENU: Self = Self {
        prefix: "menu",
        root: "node",
        section: "node",
        leaf: "leaf",
    };

    /// Name of a node kind inside this family (`book`, `section`, `page`, ...).
    pub fn kind_name(&self, kind: NodeKind) -> &'static str {
        match kind {
            NodeKind::Root => self.root,
            NodeKind::Section => self.section,
            NodeKind::Leaf => self.leaf,
        }
    }

    /// `{prefix}_{suffix}`
    pub fn class(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.prefix)
    }

    /// `data-{prefix}-{name}`
    pub fn data(&self, name: &str) -> String {
        format!("data-{}-{name}", self.prefix)
    }

    fn kind_class(&self, kind: NodeKind, suffix: &str) -> String {
        format!("{}_{}_{suffix}", self.prefix, self.kind_name(kind))
    }
}

fn tag(document: &mut Document, tree: &ContentTree, family: &Family, idx: usize, element: NodeId) {
    document.set_attr(element, &family.data("id"), tree.node(idx).id.to_string());
    document.set_attr(element, &family.data("level"), tree.level(idx).to_string());
}

fn element(document: &mut Document, tag_name: &str, classes: &[String]) -> NodeId {
    let el = document.create_element(tag_name);
    for class in classes {
        document.add_class(el, class);
    }
    el
}

/// `<span>` holding the node title.
pub fn label_view(document: &mut Document, tree: &ContentTree, family: &Family, idx: usize) -> NodeId {
    let node = tree.node(idx);
    let el = element(
        document,
        "span",
        &[
            family.class("label"),
            family.class("title"),
            family.kind_class(node.kind, "label"),
        ],
    );
    document.set_text(el, node.title.clone());
    tag(document, tree, family, idx, el);
    el
}

/// `<a>` to the node's link target, or its label when it has none.
pub fn link_view(document: &mut Document, tree: &ContentTree, family: &Family, idx: usize) -> NodeId {
    let Some(target) = tree.link_target(idx) else {
        return label_view(document, tree, family, idx);
    };
    let node = tree.node(idx);
    let el = element(
        document,
        "a",
        &[
            family.class("link"),
            family.class("title"),
            family.kind_class(node.kind, "link"),
        ],
    );
    document.set_attr(el, "href", target.content_url());
    document.set_text(el, node.title.clone());
    tag(document, tree, family, idx, el);
    el
}

/// `<div>` holding the node body parsed as markup.
pub fn body_view(
    document: &mut Document,
    tree: &ContentTree,
    family: &Family,
    idx: usize,
) -> Result<NodeId, DomError> {
    let node = tree.node(idx);
    let body = node.body.as_deref().unwrap_or_default();
    let el = document.parse_fragment(&format!("<div>{body}</div>"))?;
    document.add_class(el, &family.class("body"));
    document.add_class(el, &family.kind_class(node.kind, "body"));
    tag(document, tree, family, idx, el);
    Ok(el)
}

/// Breadcrumb: links to every ancestor, then the node's own label.
pub fn context_view(document: &mut Document, tree: &ContentTree, family: &Family, idx: usize) -> NodeId {
    let list = element(document, "ol", &[family.class("context")]);
    tag(document, tree, family, idx, list);
    for ancestor in tree.ancestors(idx) {
        let item = element(document, "li", &[family.class("context_item")]);
        let link = link_view(document, tree, family, ancestor);
        document.append_child(item, link);
        document.append_child(list, item);
    }
    let item = element(
        document,
        "li",
        &[family.class("context_item"), family.class("context_current")],
    );
    let label = label_view(document, tree, family, idx);
    document.append_child(item, label);
    document.append_child(list, item);
    list
}

/// Table of contents settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentsOptions {
    /// Items deeper than this level start collapsed.
    pub expand_depth: usize,
    /// Number of levels rendered below the listed node.
    pub max_depth: usize,
    /// Whether collapsed levels get toggles.
    pub expandable: bool,
    /// Node whose line stays expanded and is marked selected.
    pub selected: Option<ResourceId>,
    /// Number of `{family}_column` containers the top-level items are
    /// split across. One keeps them directly in the list.
    pub columns: usize,
}

impl Default for ContentsOptions {
    fn default() -> Self {
        Self {
            expand_depth: usize::MAX,
            max_depth: usize::MAX,
            expandable: false,
            selected: None,
            columns: 1,
        }
    }
}

/// Nested `ol`/`li` table of contents of the children of `idx`.
///
/// The selected node, if any, is marked with [`select`].
pub fn contents_view(
    document: &mut Document,
    tree: &ContentTree,
    family: &Family,
    idx: usize,
    options: &ContentsOptions,
) -> NodeId {
    let selected = options
        .selected
        .as_ref()
        .and_then(|id| tree.resolve_target(id));
    let builder = ContentsBuilder {
        tree,
        family,
        options,
        selected,
    };
    let list = builder.list(document, idx, options.max_depth);
    if options.columns > 1 {
        columnate(document, list, family, options.columns);
    }
    if options.expandable {
        document.set_attr(list, &family.data("expandable"), "true");
    }
    if let Some(id) = &options.selected {
        select(document, list, tree, family, id);
    }
    list
}

/// Move the items of `list` into `columns` `{family}_column` containers.
///
/// Column `i` takes items `i * n / columns` up to `(i + 1) * n / columns`,
/// so later columns take the remainder.
fn columnate(document: &mut Document, list: NodeId, family: &Family, columns: usize) {
    let items = document.child_elements(list);
    let n = items.len();
    document.set_attr(list, &family.data("columns"), columns.to_string());
    for i in 0..columns {
        let column = element(document, "div", &[family.class("column")]);
        for &item in &items[i * n / columns..(i + 1) * n / columns] {
            document.append_child(column, item);
        }
        document.append_child(list, column);
    }
}

struct ContentsBuilder<'a> {
    tree: &'a ContentTree,
    family: &'a Family,
    options: &'a ContentsOptions,
    selected: Option<usize>,
}

impl ContentsBuilder<'_> {
    fn list(&self, document: &mut Document, idx: usize, depth: usize) -> NodeId {
        let kind = self.tree.node(idx).kind;
        let list = element(
            document,
            "ol",
            &[
                self.family.class("contents"),
                self.family.kind_class(kind, "contents"),
            ],
        );
        tag(document, self.tree, self.family, idx, list);
        if depth == 0 {
            return list;
        }
        for &child in self.tree.children(idx) {
            let item = self.item(document, child, depth - 1);
            document.append_child(list, item);
        }
        list
    }

    fn item(&self, document: &mut Document, idx: usize, depth: usize) -> NodeId {
        let tree = self.tree;
        let family = self.family;
        let kind = tree.node(idx).kind;
        let item = element(
            document,
            "li",
            &[
                family.class("contents_item"),
                format!("{}_contents_{}_item", family.prefix, family.kind_name(kind)),
            ],
        );
        tag(document, tree, family, idx, item);

        let level = tree.level(idx);
        let deep = level > self.options.expand_depth;

        let nested = if kind == NodeKind::Leaf || depth == 0 {
            let link = link_view(document, tree, family, idx);
            document.append_child(item, link);
            None
        } else {
            let label = label_view(document, tree, family, idx);
            if deep && self.options.expandable {
                document.add_class(label, &family.class("toggle"));
                document.set_attr(label, &family.data("toggle"), tree.node(idx).id.to_string());
            }
            document.append_child(item, label);
            let list = self.list(document, idx, depth);
            document.append_child(item, list);
            Some(list)
        };

        let on_selected_path = self.selected.is_some_and(|sel| tree.is_on_path(idx, sel));
        if deep && !on_selected_path {
            document.add_class(item, &family.class("collapsed"));
            if let Some(list) = nested {
                document.set_style(list, "display", "none");
            }
        }
        item
    }
}

/// Mark the line of `id` inside a table of contents.
///
/// Every item on the line gets `{family}_selected_line`, the item of the
/// node itself `{family}_selected`, and the line is expanded so the
/// selection is visible. Returns `false` when `id` is not in the tree.
pub fn select(
    document: &mut Document,
    contents: NodeId,
    tree: &ContentTree,
    family: &Family,
    id: &ResourceId,
) -> bool {
    let Some(idx) = tree.resolve_target(id) else {
        return false;
    };
    let line: Vec<String> = tree.line(idx).iter().map(ToString::to_string).collect();
    let target = tree.node(idx).id.to_string();
    let id_attr = family.data("id");

    for item in document.find_by_class(contents, &family.class("contents_item")) {
        let Some(item_id) = document.attr(item, &id_attr).map(str::to_owned) else {
            continue;
        };
        if !line.contains(&item_id) {
            continue;
        }
        document.add_class(item, &family.class("selected_line"));
        if item_id == target {
            document.add_class(item, &family.class("selected"));
        }
        document.remove_class(item, &family.class("collapsed"));
        for list in document.children_with_class(item, &family.class("contents")) {
            document.remove_style(list, "display");
        }
    }
    true
}

/// Clear every selection marker inside a table of contents.
pub fn deselect(document: &mut Document, contents: NodeId, family: &Family) {
    for class in [family.class("selected"), family.class("selected_line")] {
        for item in document.find_by_class(contents, &class) {
            document.remove_class(item, &class);
        }
    }
}

/// [`deselect`] followed by [`select`].
pub fn reselect(
    document: &mut Document,
    contents: NodeId,
    tree: &ContentTree,
    family: &Family,
    id: &ResourceId,
) -> bool {
    deselect(document, contents, family);
    select(document, contents, tree, family, id)
}
