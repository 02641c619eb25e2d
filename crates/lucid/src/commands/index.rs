//! `lucid index` command implementation.

use clap::Args;
use lucid_blocks::{BlockError, ErrorPolicy};
use lucid_content::{book_search_index, parse_books};
use lucid_storage::{FsStorage, Storage};

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the index command.
#[derive(Args)]
pub(crate) struct IndexArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Book database to index, relative to the site directory.
    #[arg(short, long, default_value = lucid_content::book::DEFAULT_DATABASE_URL)]
    url: String,

    /// Maximum characters per body snippet (overrides config).
    #[arg(long)]
    snippet_length: Option<usize>,
}

impl IndexArgs {
    /// Execute the index command.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read or, in strict mode,
    /// contains a broken entry.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config()?;
        let storage = FsStorage::new(config.storage_resolved.root.clone());

        let source = storage.read(&self.url).await?;
        let report = parse_books(&self.url, &source)?;
        let policy = ErrorPolicy::new(config.error_mode);
        for err in report.errors {
            policy.report(BlockError::from(err))?;
        }
        for warning in policy.warnings() {
            output.warning(&format!("Warning: {warning}"));
        }

        let snippet_length = self.snippet_length.unwrap_or(config.book.snippet_length);
        let entries = book_search_index(&report.tree, snippet_length);
        output.result(&serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}
