//! # Completions Command Implementation
//!
//! Writes a shell completion script for `repo-packager` to stdout, generated
//! from the clap command definition by `clap_complete`.
//!
//! ```bash
//! repo-packager completions bash > ~/.local/share/bash-completion/completions/repo-packager
//! repo-packager completions zsh > ~/.zfunc/_repo-packager
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, bin_name, &mut io::stdout());
    Ok(())
}
