//! Block expansion engine for Lucid.
//!
//! Pages are assembled from *block elements*: elements whose class names a
//! registered handler. The [`BlockEngine`] walks a document subtree, expands
//! children before their parent, and replaces each block with whatever its
//! handler produces, recursing into the result.
//!
//! # Architecture
//!
//! - [`ResourceId`]: `type/seg/...` page identifiers
//! - [`HandlerRegistry`]: block handlers by class, page handlers by type
//! - [`BlockEngine`]: the recursive expansion with an [`ErrorPolicy`]
//! - [`Module`]: how content modules register their handlers
//! - [`CoreModule`]: `core_link_block` and `core_template_block`
//!
//! # Example
//!
//! ```ignore
//! let mut registry = HandlerRegistry::new();
//! registry.register_block("note_block", Handler::template("templates/note.html"))?;
//! let engine = BlockEngine::new(registry, storage, EngineConfig::default());
//!
//! let root = document.root();
//! engine.expand(&mut document, Some(root), &ResourceId::parse("home_page")?).await?;
//! ```

mod args;
mod builtin;
mod context;
mod engine;
mod error;
mod handler;
mod id;
mod module;
mod policy;
mod registry;

pub use args::{ArgSpec, BlockArguments};
pub use builtin::{CoreModule, LINK_CLASS};
pub use context::{BlockContext, PageContext};
pub use engine::{BlockEngine, EngineConfig, ID_BLOCK, PAGE_BLOCK};
pub use error::{BlockError, ErrorKind, Namespace};
pub use handler::{BlockHandler, BoxFuture, Handler, PageHandler, PageLoadHandler};
pub use id::{ResourceId, is_prefix};
pub use module::{LoadContext, Module};
pub use policy::ErrorPolicy;
pub use registry::HandlerRegistry;
