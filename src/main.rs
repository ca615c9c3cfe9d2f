mod cli;
mod engine;
mod error;
mod input;
mod logging;
mod metrics;
mod model;
mod orchestrator;
mod sequence;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args).await
}
