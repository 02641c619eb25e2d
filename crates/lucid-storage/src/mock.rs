//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::storage::{ReadFuture, Storage, StorageError, normalize_url};

const BACKEND: &str = "Mock";

/// In-memory storage keyed by URL.
///
/// Counts reads per URL so tests can assert on caching.
///
/// # Example
///
/// ```ignore
/// use lucid_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new().with_file("page.html", "<p>Hi</p>");
/// let content = storage.read("page.html").await.unwrap();
/// assert_eq!(storage.read_count("page.html"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<HashMap<String, String>>,
    reads: RwLock<HashMap<String, usize>>,
}

impl MockStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add content for a URL.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, url: &str, content: impl Into<String>) -> Self {
        self.insert(url, content);
        self
    }

    /// Add or replace content for a URL after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, url: &str, content: impl Into<String>) {
        self.files
            .write()
            .unwrap()
            .insert(normalize_url(url).to_owned(), content.into());
    }

    /// Number of reads issued for `url`, successful or not.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn read_count(&self, url: &str) -> usize {
        self.reads
            .read()
            .unwrap()
            .get(normalize_url(url))
            .copied()
            .unwrap_or(0)
    }
}

impl Storage for MockStorage {
    fn read<'a>(&'a self, url: &'a str) -> ReadFuture<'a> {
        Box::pin(async move {
            let key = normalize_url(url);
            *self.reads.write().unwrap().entry(key.to_owned()).or_default() += 1;
            self.files
                .read()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| StorageError::not_found(key).with_backend(BACKEND))
        })
    }

    fn exists(&self, url: &str) -> bool {
        self.files.read().unwrap().contains_key(normalize_url(url))
    }
}
