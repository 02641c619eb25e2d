//! Error types for block expansion.

use std::fmt;

use lucid_dom::DomError;
use lucid_storage::StorageError;

/// Handler namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Handlers keyed by block class name.
    Block,
    /// Handlers keyed by id type token.
    Page,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => f.write_str("block"),
            Self::Page => f.write_str("page"),
        }
    }
}

/// Coarse category of a [`BlockError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad registration or engine setup.
    Configuration,
    /// An id, handler or argument could not be resolved.
    Resolution,
    /// A fragment or database could not be fetched.
    Fetch,
    /// A fetched source could not be parsed.
    Parse,
}

/// Errors raised while registering handlers or expanding blocks.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("a {namespace} handler named '{name}' is already registered")]
    DuplicateHandler { name: String, namespace: Namespace },

    #[error("invalid handler for '{0}': template URL is empty")]
    InvalidHandler(String),

    #[error("'{0}' is not a valid resource id")]
    InvalidId(String),

    #[error("no page handler registered for type '{0}'")]
    UnknownPageType(String),

    #[error("'{0}' does not reference an existing resource")]
    UnknownResource(String),

    #[error("required block argument '{0}' is missing")]
    MissingArgument(String),

    #[error("block argument '{name}' is invalid: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("failed to fetch '{url}': {source}")]
    Fetch {
        url: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to parse '{url}': {source}")]
    Parse {
        url: String,
        #[source]
        source: DomError,
    },

    /// A fetched source parsed but does not have the expected structure.
    #[error("invalid content in '{url}': {message}")]
    Content { url: String, message: String },

    #[error("maximum expansion depth ({0}) exceeded")]
    DepthExceeded(usize),

    /// Failure raised by a handler for its own reasons.
    #[error("{0}")]
    Handler(String),
}

impl BlockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateHandler { .. } | Self::InvalidHandler(_) | Self::DepthExceeded(_) => {
                ErrorKind::Configuration
            }
            Self::InvalidId(_)
            | Self::UnknownPageType(_)
            | Self::UnknownResource(_)
            | Self::MissingArgument(_)
            | Self::InvalidArgument { .. }
            | Self::Handler(_) => ErrorKind::Resolution,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Parse { .. } | Self::Content { .. } => ErrorKind::Parse,
        }
    }
}
