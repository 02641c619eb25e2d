//! Book module: books, manuals and other text divided into sections and
//! pages.
//!
//! A book database looks like:
//!
//! ```xml
//! <books>
//!   <book>
//!     <name>guide</name>
//!     <title>User Guide</title>
//!     <body>Welcome.</body>
//!     <content>
//!       <section>
//!         <name>basics</name>
//!         <title>Basics</title>
//!         <content>
//!           <page><name>install</name><title>Install</title><body>...</body></page>
//!         </content>
//!       </section>
//!     </content>
//!   </book>
//! </books>
//! ```
//!
//! Ids are `book_{book,section,page}_page/{database url}/{names...}`.

use std::sync::Arc;

use lucid_blocks::{
    BlockContext, BlockError, BlockHandler, BoxFuture, Handler, LoadContext, Module,
    PageContext, PageHandler,
};
use lucid_config::BookTemplates;
use lucid_dom::NodeId;

use crate::cache::ForestCache;
use crate::contents::{ContentsArgs, ContentsBlock};
use crate::forest::{ForestSource, markup_error, text_id};
use crate::search::{SearchEntry, search_index};
use crate::source::{ParseError, ParseReport, Schema, parse_forest};
use crate::tree::{ContentTree, NodeKind};
use crate::views::{Family, body_view, context_view, label_view, link_view};

pub const BOOK_PAGE: &str = "book_book_page";
pub const SECTION_PAGE: &str = "book_section_page";
pub const PAGE_PAGE: &str = "book_page_page";

/// Database loaded when the module entry names no URL.
pub const DEFAULT_DATABASE_URL: &str = "modules/book/database.xml";

fn book_entry(tag: &str, top: bool) -> Option<(NodeKind, &'static str)> {
    match (tag, top) {
        ("book", true) => Some((NodeKind::Root, BOOK_PAGE)),
        ("section", false) => Some((NodeKind::Section, SECTION_PAGE)),
        ("page", false) => Some((NodeKind::Leaf, PAGE_PAGE)),
        _ => None,
    }
}

const SCHEMA: Schema = Schema {
    root: "books",
    container: "content",
    entry: book_entry,
};

/// Parse a book database fetched from `url`.
pub fn parse_books(url: &str, source: &str) -> Result<ParseReport, ParseError> {
    parse_forest(url, source, &SCHEMA, &|fields, node| {
        let mut node = node.with_title(fields.text("title").unwrap_or_default());
        node.body = fields.markup("body");
        Ok(node)
    })
}

/// Search entries for every book, section and page of `tree`.
pub fn book_search_index(tree: &ContentTree, snippet_length: usize) -> Vec<SearchEntry> {
    search_index(tree, snippet_length)
}

const CONTENTS_ARGS: ContentsArgs = ContentsArgs {
    id: "book_id",
    num_columns: "book_num_columns",
    max_level: "book_max_level",
    expand_level: "book_expand_level",
    expandable: "book_expandable",
    selected: "book_selected_element_id",
};

/// Registers the book blocks and the three book page types.
pub struct BookModule {
    cache: Arc<ForestCache>,
}

impl BookModule {
    pub fn new(cache: Arc<ForestCache>) -> Self {
        Self { cache }
    }
}

impl Module for BookModule {
    fn name(&self) -> &'static str {
        "book"
    }

    fn load<'a>(&'a self, mut cx: LoadContext<'a>) -> BoxFuture<'a, Result<(), BlockError>> {
        Box::pin(async move {
            let forests = ForestSource::new(Arc::clone(&self.cache), parse_books);
            let module = cx.module;
            let url = module.url.as_deref().unwrap_or(DEFAULT_DATABASE_URL);
            forests.preload(cx.storage.as_ref(), url, cx.policy).await?;

            for (name, view) in [
                ("book_body_block", View::Body),
                ("book_label_block", View::Label),
                ("book_link_block", View::Link),
                ("book_context_block", View::Context),
            ] {
                cx.register_block(
                    name,
                    Handler::block(ViewBlock {
                        forests: forests.clone(),
                        view,
                    }),
                )?;
            }
            cx.register_block(
                "book_contents_block",
                Handler::block(ContentsBlock {
                    forests: forests.clone(),
                    family: Family::BOOK,
                    args: CONTENTS_ARGS,
                }),
            )?;

            let config = cx.config;
            let templates: &BookTemplates = &config.book.templates;
            for (name, template) in [
                (BOOK_PAGE, &templates.book),
                (SECTION_PAGE, &templates.section),
                (PAGE_PAGE, &templates.page),
            ] {
                cx.register_page(
                    name,
                    Handler::page(BookPage {
                        forests: forests.clone(),
                        template: template.clone(),
                    }),
                )?;
            }
            tracing::info!(url, "Loaded book module");
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum View {
    Body,
    Label,
    Link,
    Context,
}

/// Replaces the block with a view of the node whose id is the block text.
struct ViewBlock {
    forests: ForestSource,
    view: View,
}

impl BlockHandler for ViewBlock {
    fn expand<'a>(
        &'a self,
        mut cx: BlockContext<'a>,
    ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
        Box::pin(async move {
            let id = text_id(&cx)?;
            let (tree, idx) = self.forests.resolve(cx.engine, &id).await?;
            let family = Family::BOOK;
            let element = match self.view {
                View::Body => {
                    body_view(cx.document, &tree, &family, idx).map_err(|e| markup_error(&id, e))?
                }
                View::Label => label_view(cx.document, &tree, &family, idx),
                View::Link => link_view(cx.document, &tree, &family, idx),
                View::Context => context_view(cx.document, &tree, &family, idx),
            };
            cx.replace_with(element);
            Ok(Some(element))
        })
    }
}

/// Renders a book, section or page from its page template.
///
/// The template usually embeds blocks such as
/// `<div class="book_body_block"><span class="core_id_block"/></div>`.
struct BookPage {
    forests: ForestSource,
    template: String,
}

impl PageHandler for BookPage {
    fn render<'a>(&'a self, mut cx: PageContext<'a>) -> BoxFuture<'a, Result<NodeId, BlockError>> {
        Box::pin(async move {
            self.forests.resolve(cx.engine, cx.id).await?;
            cx.fetch_fragment(&self.template).await
        })
    }
}
