//! Storage trait and error types.
//!
//! Provides the [`Storage`] trait for fetching fragment sources by URL,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # URL Convention
//!
//! URLs are relative to the site root and use `/` separators:
//! - `"index.html"` - the document shell
//! - `"data/books.xml"` - a content database
//! - `"modules/book/templates/page_page.html"` - a page template
//!
//! A leading `/` is ignored. Backends map URLs to their internal layout.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

/// Boxed future returned by [`Storage::read`].
pub type ReadFuture<'a> = Pin<Box<dyn Future<Output = Result<String, StorageError>> + Send + 'a>>;

/// Why a read failed, independent of the backend that failed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    NotFound,
    PermissionDenied,
    /// URL escapes the root or is otherwise malformed.
    InvalidPath,
    /// Resource exists but is not valid UTF-8 text.
    InvalidContent,
    Timeout,
    Other,
}

impl StorageErrorKind {
    fn label(self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::PermissionDenied => "Permission denied",
            Self::InvalidPath => "Invalid path",
            Self::InvalidContent => "Invalid content",
            Self::Timeout => "Timeout",
            Self::Other => "Error",
        }
    }
}

impl From<std::io::ErrorKind> for StorageErrorKind {
    fn from(kind: std::io::ErrorKind) -> Self {
        use std::io::ErrorKind as Io;
        match kind {
            Io::NotFound => Self::NotFound,
            Io::PermissionDenied => Self::PermissionDenied,
            Io::InvalidData => Self::InvalidContent,
            Io::TimedOut => Self::Timeout,
            _ => Self::Other,
        }
    }
}

/// A failed read, tagged with the backend and the location it touched.
///
/// Rendered as `[Backend] Kind: cause (path: url)`, omitting whatever parts
/// are unknown.
#[derive(Debug)]
pub struct StorageError {
    pub kind: StorageErrorKind,
    /// URL as requested, or the file it mapped to.
    pub path: Option<PathBuf>,
    /// Short backend tag such as `"Fs"` or `"Mock"`.
    pub backend: Option<&'static str>,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            cause: None,
        }
    }

    /// Shorthand for a [`StorageErrorKind::NotFound`] at `url`.
    #[must_use]
    pub fn not_found(url: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(url)
    }

    /// Wrap an I/O failure on `path`, keeping it as the cause.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::new(err.kind().into()).with_source(err).with_path(path)
    }

    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_backend(self, backend: &'static str) -> Self {
        Self {
            backend: Some(backend),
            ..self
        }
    }

    #[must_use]
    pub fn with_source(self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            cause: Some(Box::new(cause)),
            ..self
        }
    }

    /// The underlying cause as `E`, if it is one.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.cause.as_deref()?.downcast_ref()
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }
        f.write_str(self.kind.label())?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        match &self.path {
            Some(path) => write!(f, " (path: {})", path.display()),
            None => Ok(()),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause: &(dyn std::error::Error + 'static) = self.cause.as_deref()?;
        Some(cause)
    }
}

/// Fetches fragment and database sources by URL.
///
/// Reads are asynchronous; callers await each read before continuing, so a
/// backend never sees overlapping reads from a single render.
pub trait Storage: Send + Sync {
    /// Read the full text behind `url`.
    fn read<'a>(&'a self, url: &'a str) -> ReadFuture<'a>;

    /// Check if `url` resolves to something readable.
    ///
    /// Returns `false` on errors.
    fn exists(&self, url: &str) -> bool;
}

/// Strip the leading `/` and any `?query` or `#fragment` from a URL.
pub(crate) fn normalize_url(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_storage_error_kind_from_io() {
        assert_eq!(
            StorageErrorKind::from(std::io::ErrorKind::InvalidData),
            StorageErrorKind::InvalidContent
        );
        assert_eq!(
            StorageErrorKind::from(std::io::ErrorKind::Interrupted),
            StorageErrorKind::Other
        );
    }

    #[test]
    fn test_storage_error_with_path_and_backend() {
        let err = StorageError::not_found("data/books.xml").with_backend("Fs");

        assert_eq!(err.path.as_deref(), Some(Path::new("data/books.xml")));
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_storage_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::io(io_err, "index.html");

        assert_eq!(err.kind, StorageErrorKind::PermissionDenied);
        assert!(err.downcast_source::<std::io::Error>().is_some());
    }

    #[test]
    fn test_storage_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = StorageError::io(io_err, "page.html").with_backend("Fs");

        assert_eq!(
            err.to_string(),
            "[Fs] Not found: no such file (path: page.html)"
        );
    }

    #[test]
    fn test_storage_error_display_minimal() {
        let err = StorageError::new(StorageErrorKind::InvalidPath);

        assert_eq!(err.to_string(), "Invalid path");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/data/books.xml"), "data/books.xml");
        assert_eq!(normalize_url("page.html?v=2"), "page.html");
        assert_eq!(normalize_url("page.html#top"), "page.html");
        assert_eq!(normalize_url("index.html"), "index.html");
    }
}
