//! Handler traits.
//!
//! A block handler receives a [`BlockContext`] and resolves to:
//! - `Ok(Some(node))`: `node` replaced the block and is expanded next
//! - `Ok(None)`: the handler finished the block itself
//! - `Err(_)`: the failure is reported through the error policy
//!
//! Futures are `!Send`; the engine runs on a single thread and awaits each
//! handler before moving to the next sibling.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use lucid_dom::{Document, NodeId};

use crate::context::{BlockContext, PageContext};
use crate::error::BlockError;
use crate::id::ResourceId;

/// Boxed single-threaded future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Expands elements carrying a registered block class.
pub trait BlockHandler {
    fn expand<'a>(&'a self, cx: BlockContext<'a>)
    -> BoxFuture<'a, Result<Option<NodeId>, BlockError>>;
}

/// Renders the page element for ids of one type.
///
/// The returned node is detached; the caller positions and expands it.
pub trait PageHandler {
    fn render<'a>(&'a self, cx: PageContext<'a>) -> BoxFuture<'a, Result<NodeId, BlockError>>;
}

/// Runs after every page navigation, in registration order.
pub trait PageLoadHandler {
    fn on_page_load<'a>(
        &'a self,
        document: &'a mut Document,
        id: &'a ResourceId,
    ) -> BoxFuture<'a, Result<(), BlockError>>;

    /// Whether the handler still applies to `document`. Handlers bound to an
    /// element return `false` once that element left the page, and are dropped.
    fn is_live(&self, _document: &Document) -> bool {
        true
    }
}

/// A registered handler: a template URL or a function.
pub enum Handler<H: ?Sized> {
    /// The element (or page) is replaced by the fragment at this URL.
    Template(String),
    Function(Rc<H>),
}

impl<H: ?Sized> Handler<H> {
    pub fn template(url: impl Into<String>) -> Self {
        Self::Template(url.into())
    }
}

impl Handler<dyn BlockHandler> {
    pub fn block(handler: impl BlockHandler + 'static) -> Self {
        Self::Function(Rc::new(handler))
    }
}

impl Handler<dyn PageHandler> {
    pub fn page(handler: impl PageHandler + 'static) -> Self {
        Self::Function(Rc::new(handler))
    }
}

impl<H: ?Sized> Clone for Handler<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Template(url) => Self::Template(url.clone()),
            Self::Function(f) => Self::Function(Rc::clone(f)),
        }
    }
}

impl<H: ?Sized> std::fmt::Debug for Handler<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(url) => f.debug_tuple("Template").field(url).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}
