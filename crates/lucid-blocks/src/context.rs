//! Per-invocation contexts handed to handlers.

use std::rc::Rc;

use lucid_dom::{Document, NodeId};

use crate::args::{ArgSpec, BlockArguments};
use crate::engine::BlockEngine;
use crate::error::BlockError;
use crate::handler::PageLoadHandler;
use crate::id::ResourceId;

/// State threaded through one block handler invocation.
pub struct BlockContext<'a> {
    pub engine: &'a BlockEngine,
    pub document: &'a mut Document,
    /// The block element being expanded.
    pub element: NodeId,
    /// Ambient page id.
    pub id: &'a ResourceId,
    pub(crate) depth: usize,
}

impl BlockContext<'_> {
    /// Trimmed text of the block element.
    pub fn text(&self) -> String {
        self.document.text_content(self.element).trim().to_owned()
    }

    /// Expand `node` under the ambient id.
    pub async fn expand(&mut self, node: NodeId) -> Result<(), BlockError> {
        self.engine
            .expand_at(self.document, Some(node), self.id, self.depth + 1)
            .await
    }

    /// Fetch and parse a fragment into a detached node.
    pub async fn fetch_fragment(&mut self, url: &str) -> Result<NodeId, BlockError> {
        self.engine.fetch_fragment(self.document, url).await
    }

    /// Replace the block element with the fragment at `url` and return it.
    pub async fn replace_with_template(&mut self, url: &str) -> Result<NodeId, BlockError> {
        let fragment = self.fetch_fragment(url).await?;
        self.document.replace_with(self.element, fragment);
        Ok(fragment)
    }

    /// Replace the block element with `node`.
    pub fn replace_with(&mut self, node: NodeId) {
        self.document.replace_with(self.element, node);
    }

    /// Collect the argument children of the block element.
    pub fn arguments(&self, schema: &[ArgSpec]) -> Result<BlockArguments, BlockError> {
        BlockArguments::parse(self.document, self.element, schema)
    }

    /// Register a handler run after every later page load.
    pub fn on_page_load(&self, handler: Rc<dyn PageLoadHandler>) {
        self.engine.on_page_load(handler);
    }
}

/// State threaded through one page handler invocation.
pub struct PageContext<'a> {
    pub engine: &'a BlockEngine,
    pub document: &'a mut Document,
    /// Id of the page being rendered.
    pub id: &'a ResourceId,
}

impl PageContext<'_> {
    /// Fetch and parse a fragment into a detached node.
    pub async fn fetch_fragment(&mut self, url: &str) -> Result<NodeId, BlockError> {
        self.engine.fetch_fragment(self.document, url).await
    }
}
