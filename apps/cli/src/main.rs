//! readmegen CLI: refresh the generated regions of a profile README.
//!
//! Pulls recent contributions, notes, and blog posts, then rewrites the
//! comment-delimited regions of the README and the contributions file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
