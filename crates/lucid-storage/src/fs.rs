//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading fragments from a site directory.

use std::path::{Component, Path, PathBuf};

use crate::storage::{ReadFuture, Storage, StorageError, StorageErrorKind, normalize_url};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a site directory.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use lucid_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("site"));
/// let shell = storage.read("index.html").await?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory URLs are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL to a file under the root.
    ///
    /// Rejects URLs containing `..` or absolute components so reads cannot
    /// escape the site directory.
    fn resolve(&self, url: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(normalize_url(url));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes || relative.as_os_str().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(url)
                .with_backend(BACKEND));
        }
        Ok(self.root.join(relative))
    }
}

impl Storage for FsStorage {
    fn read<'a>(&'a self, url: &'a str) -> ReadFuture<'a> {
        Box::pin(async move {
            let full_path = self.resolve(url)?;
            tracing::debug!(url, path = %full_path.display(), "Reading fragment");
            tokio::fs::read_to_string(&full_path)
                .await
                .map_err(|e| StorageError::io(e, full_path).with_backend(BACKEND))
        })
    }

    fn exists(&self, url: &str) -> bool {
        self.resolve(url).is_ok_and(|path| path.is_file())
    }
}
