//! CLI error types.

use lucid_blocks::BlockError;
use lucid_config::ConfigError;
use lucid_content::ParseError;
use lucid_dom::DomError;
use lucid_site::SiteError;
use lucid_storage::StorageError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Dom(#[from] DomError),

    #[error("{0}")]
    Block(#[from] BlockError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
