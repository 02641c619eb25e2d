//! Content trees and the content modules for Lucid.
//!
//! This crate provides:
//! - [`ContentTree`]: an immutable forest of roots, sections and leaves
//! - Views rendering nodes as labels, links, bodies, breadcrumbs and tables
//!   of contents
//! - [`BookModule`], [`MenuModule`] and [`TemplateModule`], which load their
//!   XML sources into a shared [`ForestCache`] and register block and page
//!   handlers
//! - [`search_index`] for the flat search projection of a forest
//!
//! # Quick Start
//!
//! ```ignore
//! use lucid_content::{BookModule, ForestCache};
//!
//! let cache = Arc::new(ForestCache::new());
//! BookModule::new(Arc::clone(&cache))
//!     .load(LoadContext {
//!         registry: &mut registry,
//!         storage: &storage,
//!         config: &config,
//!         module: &entry,
//!         policy: &policy,
//!     })
//!     .await?;
//!
//! let tree = cache.get("modules/book/database.xml").unwrap();
//! let entries = lucid_content::book_search_index(&tree, 500);
//! ```

pub mod book;
mod cache;
mod contents;
mod forest;
pub mod menu;
mod search;
mod source;
pub mod template;
mod tree;
mod views;

pub use book::{BookModule, book_search_index, parse_books};
pub use cache::ForestCache;
pub use menu::{MenuModule, parse_menu};
pub use search::{ELLIPSIS, SearchEntry, search_index, snippet, strip_markup};
pub use source::{ParseError, ParseReport};
pub use template::{TemplateForest, TemplateModule, parse_templates};
pub use tree::{ContentNode, ContentTree, ContentTreeBuilder, FlatEntry, NodeKind};
pub use views::{
    ContentsOptions, Family, body_view, context_view, contents_view, deselect, label_view,
    link_view, reselect, select,
};
