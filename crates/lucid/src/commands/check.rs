//! `lucid check` command implementation.

use clap::Args;
use lucid_blocks::Namespace;
use lucid_config::ErrorMode;
use lucid_site::{Navigator, Site};

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub site: SiteArgs,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// Every module is loaded in lenient mode so all problems are listed,
    /// not just the first.
    ///
    /// # Errors
    ///
    /// Returns an error if any module reported a problem.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let mut config = self.site.load_config()?;
        config.validate()?;
        config.error_mode = ErrorMode::Lenient;

        let navigator = Navigator::default();
        let site = Site::builder(&config).build(navigator.subscribe()).await?;

        let registry = site.engine().registry();
        output.info(&format!("Modules: {}", site.modules().join(", ")));
        output.info(&format!(
            "Block handlers: {}",
            registry.names(Namespace::Block).join(", ")
        ));
        output.info(&format!(
            "Page handlers: {}",
            registry.names(Namespace::Page).join(", ")
        ));

        let warnings = site.warnings();
        if warnings.is_empty() {
            output.success("No problems found");
            return Ok(());
        }
        for warning in &warnings {
            output.warning(warning);
        }
        Err(CliError::Validation(format!(
            "{} problem(s) found",
            warnings.len()
        )))
    }
}
