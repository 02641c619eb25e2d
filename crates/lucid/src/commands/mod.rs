//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod index;
pub(crate) mod render;

use std::path::PathBuf;

use clap::Args;
use lucid_config::{CliSettings, Config, ErrorMode};

use crate::error::CliError;

pub(crate) use check::CheckArgs;
pub(crate) use index::IndexArgs;
pub(crate) use render::RenderArgs;

/// Options shared by every command that loads the site.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover lucid.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site directory fragments are read from (overrides config).
    #[arg(short, long, env = "LUCID_ROOT")]
    root: Option<PathBuf>,

    /// Report failures as warnings and keep going (overrides config).
    #[arg(long)]
    lenient: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl SiteArgs {
    fn settings(&self) -> CliSettings {
        CliSettings {
            root: self.root.clone(),
            error_mode: self.lenient.then_some(ErrorMode::Lenient),
            default_id: None,
        }
    }

    /// Load the configuration with these overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), Some(&self.settings()))?)
    }
}
