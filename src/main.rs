//! # Repo Packager CLI
//!
//! Binary entry point for the `repo-packager` command-line tool. It parses
//! arguments with `clap`, sets up logging, and dispatches to the command
//! implementations. All packaging logic lives in the `repo_packager` library.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
