//! Lucid CLI - block-expanding content renderer.
//!
//! Provides commands for:
//! - `render`: Expand a site's document shell and print the result
//! - `index`: Print the search index of a book database as JSON
//! - `check`: Load every module and list registration and parse problems

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, IndexArgs, RenderArgs};
use output::Output;

/// Lucid - block-expanding content renderer.
#[derive(Parser)]
#[command(name = "lucid", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand the document shell and print it.
    Render(RenderArgs),
    /// Print the search index of a book database.
    Index(IndexArgs),
    /// Load every module and report problems.
    Check(CheckArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Render(args) => args.site.verbose,
            Self::Index(args) => args.site.verbose,
            Self::Check(args) => args.site.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Handler futures are !Send, so everything runs on one thread.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");
    let result = rt.block_on(async {
        match cli.command {
            Commands::Render(args) => args.execute().await,
            Commands::Index(args) => args.execute().await,
            Commands::Check(args) => args.execute().await,
        }
    });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
