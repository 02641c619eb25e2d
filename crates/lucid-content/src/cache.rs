//! Parsed forests cached by source URL.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lucid_blocks::BlockError;
use lucid_storage::Storage;

use crate::source::{ParseError, ParseReport};
use crate::tree::ContentTree;

/// Source URL to parsed forest.
///
/// A forest is parsed once; later loads of the same URL share it. There is
/// no eviction.
#[derive(Debug, Default)]
pub struct ForestCache {
    forests: RwLock<HashMap<String, Arc<ContentTree>>>,
}

impl ForestCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached forest for `url`, if loaded.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<Arc<ContentTree>> {
        self.forests.read().unwrap().get(url).cloned()
    }

    /// Return the forest for `url`, fetching and parsing it on first use.
    ///
    /// Entry-level parse errors are handed to `report` one by one; if it
    /// returns an error the forest is not cached and the error is returned.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub async fn load(
        &self,
        storage: &dyn Storage,
        url: &str,
        parse: fn(&str, &str) -> Result<ParseReport, ParseError>,
        report: &dyn Fn(BlockError) -> Result<(), BlockError>,
    ) -> Result<Arc<ContentTree>, BlockError> {
        if let Some(tree) = self.get(url) {
            return Ok(tree);
        }

        let source = storage
            .read(url)
            .await
            .map_err(|source| BlockError::Fetch {
                url: url.to_owned(),
                source,
            })?;
        let ParseReport { tree, errors } = parse(url, &source)?;
        for err in errors {
            report(err.into())?;
        }

        let mut forests = self.forests.write().unwrap();
        let tree = Arc::clone(
            forests
                .entry(url.to_owned())
                .or_insert_with(|| Arc::new(tree)),
        );
        tracing::info!(url, nodes = tree.len(), "Loaded content forest");
        Ok(tree)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forests.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
