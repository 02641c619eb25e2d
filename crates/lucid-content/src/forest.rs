//! Forest lookup shared by the content modules.
//!
//! Ids of content nodes start with the URL of their source document, so a
//! block only needs the id to find (and if necessary load) the forest that
//! holds the node.

use std::sync::Arc;

use lucid_blocks::{BlockContext, BlockEngine, BlockError, ErrorPolicy, PageLoadHandler, ResourceId};
use lucid_dom::{Document, DomError, NodeId};
use lucid_storage::Storage;

use crate::cache::ForestCache;
use crate::source::{ParseError, ParseReport};
use crate::tree::ContentTree;
use crate::views::{self, Family};

pub(crate) type Parser = fn(&str, &str) -> Result<ParseReport, ParseError>;

/// One content family's forests: the shared cache plus the family parser.
#[derive(Clone)]
pub(crate) struct ForestSource {
    cache: Arc<ForestCache>,
    parse: Parser,
}

impl ForestSource {
    pub fn new(cache: Arc<ForestCache>, parse: Parser) -> Self {
        Self { cache, parse }
    }

    /// Load the forest at `url` while the site starts.
    pub async fn preload(
        &self,
        storage: &dyn Storage,
        url: &str,
        policy: &ErrorPolicy,
    ) -> Result<(), BlockError> {
        match self
            .cache
            .load(storage, url, self.parse, &|err| policy.report(err))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => policy.report(err),
        }
    }

    /// Find the node `id` names, loading its forest on first use.
    pub async fn resolve(
        &self,
        engine: &BlockEngine,
        id: &ResourceId,
    ) -> Result<(Arc<ContentTree>, usize), BlockError> {
        let url = id
            .path()
            .first()
            .ok_or_else(|| BlockError::UnknownResource(id.to_string()))?;
        let tree = self
            .cache
            .load(engine.storage().as_ref(), url, self.parse, &|err| {
                engine.report(err)
            })
            .await?;
        let idx = tree
            .resolve(id)
            .ok_or_else(|| BlockError::UnknownResource(id.to_string()))?;
        Ok((tree, idx))
    }
}

/// Id held in the text of a block element.
pub(crate) fn text_id(cx: &BlockContext<'_>) -> Result<ResourceId, BlockError> {
    ResourceId::parse(&cx.text())
}

pub(crate) fn markup_error(id: &ResourceId, source: DomError) -> BlockError {
    BlockError::Parse {
        url: id.to_string(),
        source,
    }
}

/// Moves the selection of a table of contents to each newly loaded page.
pub(crate) struct Reselect {
    pub contents: NodeId,
    pub tree: Arc<ContentTree>,
    pub family: Family,
}

impl PageLoadHandler for Reselect {
    fn on_page_load<'a>(
        &'a self,
        document: &'a mut Document,
        id: &'a ResourceId,
    ) -> lucid_blocks::BoxFuture<'a, Result<(), BlockError>> {
        Box::pin(async move {
            views::reselect(document, self.contents, &self.tree, &self.family, id);
            Ok(())
        })
    }

    fn is_live(&self, document: &Document) -> bool {
        document.is_attached(self.contents)
    }
}
