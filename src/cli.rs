//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use repo_packager::output::OutputConfig;

use crate::commands;

/// Repo Packager - Build fpm packages from a list of git repositories
#[derive(Parser, Debug)]
#[command(name = "repo-packager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone, check out and package every repository in the repo list
    Build(commands::build::BuildArgs),

    /// Show the repositories of the repo list after merging DEFAULT
    List(commands::list::ListArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Build(args) => commands::build::execute(args, &output),
            Commands::List(args) => commands::list::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    // A logger may already be installed when running under a test harness
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
