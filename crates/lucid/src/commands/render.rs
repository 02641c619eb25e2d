//! `lucid render` command implementation.

use std::sync::Arc;

use clap::Args;
use lucid_blocks::ResourceId;
use lucid_dom::Document;
use lucid_site::{Navigator, Site};
use lucid_storage::{FsStorage, Storage};

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Page to navigate to after the document loads.
    #[arg(long)]
    id: Option<String>,

    /// Document shell to expand, relative to the site directory.
    #[arg(long, default_value = "index.html")]
    document: String,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if loading the site or, in strict mode, any
    /// expansion fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config()?;
        let storage: Arc<dyn Storage> =
            Arc::new(FsStorage::new(config.storage_resolved.root.clone()));

        let source = storage.read(&self.document).await?;
        let mut document = Document::parse(&source)?;

        let mut navigator = Navigator::default();
        let mut site = Site::builder(&config)
            .storage(Arc::clone(&storage))
            .build(navigator.subscribe())
            .await?;
        site.load_document(&mut document).await?;

        if let Some(id) = &self.id {
            let id = ResourceId::parse(id)?;
            if navigator.navigate(&id) {
                site.on_location_changed(&mut document).await?;
            }
        }

        for warning in site.warnings() {
            output.warning(&format!("Warning: {warning}"));
        }
        output.result(&document.outer_html(document.root()))?;
        Ok(())
    }
}
