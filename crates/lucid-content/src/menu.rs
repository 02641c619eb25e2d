//! Menu module: the site's navigation trees of nodes and leaves.
//!
//! ```xml
//! <menu>
//!   <node>
//!     <name>docs</name>
//!     <title>Documentation</title>
//!     <children>
//!       <leaf>
//!         <name>guide</name>
//!         <title>Guide</title>
//!         <link>book_book_page/books.xml/guide</link>
//!       </leaf>
//!     </children>
//!   </node>
//! </menu>
//! ```
//!
//! Ids are `menu_{node,leaf}_page/{menu url}/{names...}`. A leaf with a
//! `<link>` points at another resource; the menu selection follows pages
//! reached through such links.

use std::sync::Arc;

use lucid_blocks::{
    BlockContext, BlockError, BlockHandler, BoxFuture, Handler, LoadContext, Module,
};
use lucid_dom::NodeId;

use crate::cache::ForestCache;
use crate::contents::{ContentsArgs, ContentsBlock};
use crate::forest::{ForestSource, text_id};
use crate::source::{ParseError, ParseReport, Schema, parse_forest};
use crate::tree::NodeKind;
use crate::views::{Family, label_view, link_view};

pub const NODE_PAGE: &str = "menu_node_page";
pub const LEAF_PAGE: &str = "menu_leaf_page";

/// Menu loaded when the module entry names no URL.
pub const DEFAULT_MENU_URL: &str = "modules/menu/menu.xml";

fn menu_entry(tag: &str, top: bool) -> Option<(NodeKind, &'static str)> {
    match (tag, top) {
        ("node", true) => Some((NodeKind::Root, NODE_PAGE)),
        ("node", false) => Some((NodeKind::Section, NODE_PAGE)),
        ("leaf", _) => Some((NodeKind::Leaf, LEAF_PAGE)),
        _ => None,
    }
}

const SCHEMA: Schema = Schema {
    root: "menu",
    container: "children",
    entry: menu_entry,
};

/// Parse a menu document fetched from `url`.
pub fn parse_menu(url: &str, source: &str) -> Result<ParseReport, ParseError> {
    parse_forest(url, source, &SCHEMA, &|fields, node| {
        let mut node = node.with_title(fields.text("title").unwrap_or_default());
        if node.kind == NodeKind::Leaf {
            node.link = fields.link("link")?;
        }
        Ok(node)
    })
}

const CONTENTS_ARGS: ContentsArgs = ContentsArgs {
    id: "menu_id",
    num_columns: "menu_num_columns",
    max_level: "menu_max_level",
    expand_level: "menu_expand_level",
    expandable: "menu_expandable",
    selected: "menu_selected_element_id",
};

/// Registers the menu blocks.
pub struct MenuModule {
    cache: Arc<ForestCache>,
}

impl MenuModule {
    pub fn new(cache: Arc<ForestCache>) -> Self {
        Self { cache }
    }
}

impl Module for MenuModule {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn load<'a>(&'a self, mut cx: LoadContext<'a>) -> BoxFuture<'a, Result<(), BlockError>> {
        Box::pin(async move {
            let forests = ForestSource::new(Arc::clone(&self.cache), parse_menu);
            let module = cx.module;
            let url = module.url.as_deref().unwrap_or(DEFAULT_MENU_URL);
            forests.preload(cx.storage.as_ref(), url, cx.policy).await?;

            cx.register_block(
                "menu_contents_block",
                Handler::block(ContentsBlock {
                    forests: forests.clone(),
                    family: Family::MENU,
                    args: CONTENTS_ARGS,
                }),
            )?;
            for (name, target, view) in [
                ("menu_leaf_label_block", Target::Leaf, View::Label),
                ("menu_leaf_link_block", Target::Leaf, View::Link),
                ("menu_node_label_block", Target::Node, View::Label),
                ("menu_node_link_block", Target::Node, View::Link),
            ] {
                cx.register_block(
                    name,
                    Handler::block(MenuBlock {
                        forests: forests.clone(),
                        target,
                        view,
                    }),
                )?;
            }
            tracing::info!(url, "Loaded menu module");
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Leaf,
    Node,
}

#[derive(Debug, Clone, Copy)]
enum View {
    Label,
    Link,
}

/// Replaces the block with the label or link of the leaf or node whose id
/// is the block text.
struct MenuBlock {
    forests: ForestSource,
    target: Target,
    view: View,
}

impl BlockHandler for MenuBlock {
    fn expand<'a>(
        &'a self,
        mut cx: BlockContext<'a>,
    ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
        Box::pin(async move {
            let id = text_id(&cx)?;
            let (tree, idx) = self.forests.resolve(cx.engine, &id).await?;
            let kind = tree.node(idx).kind;
            let matches = match self.target {
                Target::Leaf => kind == NodeKind::Leaf,
                Target::Node => kind != NodeKind::Leaf,
            };
            if !matches {
                return Err(BlockError::UnknownResource(id.to_string()));
            }
            let element = match self.view {
                View::Label => label_view(cx.document, &tree, &Family::MENU, idx),
                View::Link => link_view(cx.document, &tree, &Family::MENU, idx),
            };
            cx.replace_with(element);
            Ok(Some(element))
        })
    }
}
