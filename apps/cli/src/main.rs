//! helpbook CLI: reads the platform syntax-helper container.
//!
//! Lists container entities, prints the page tree, and extracts help pages
//! into structured JSON records.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
