//! # Error Handling
//!
//! This module defines the centralized error type for `repo-packager`. It uses
//! `thiserror` to build a single `Error` enum covering every failure the
//! packaging pipeline can hit, each variant carrying enough context (file
//! name, repository name, underlying message) to diagnose a failed run without
//! re-running it with a higher log level.
//!
//! The variants group into the stages of the pipeline:
//!
//! - Loading the repo list: `ConfigLoad`, `UnknownRepository`.
//! - Preparing the working copy: `GitClone`, `GitCommand`,
//!   `UnresolvedReference`.
//! - Gathering instructions: `InstructionsNotFound`, `FpmConfigNotFound`,
//!   `InvalidOptionKey`, `InvalidOptionValue`, `MissingVersion`.
//! - Synthesizing and running fpm: `MissingPlaceholder`, `Template`,
//!   `ExecutionFailed`, `CommandSpawn`.
//!
//! Every error is fatal to the repository being processed, and the
//! orchestrator stops the whole run at the first one.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for repo-packager operations
#[derive(Error, Debug)]
pub enum Error {
    /// The repo list or an `fpm.json` file could not be read or parsed.
    #[error("Failed to load {}: {message}", path.display())]
    ConfigLoad { path: PathBuf, message: String },

    /// A repository was requested by name but is not in the repo list.
    #[error("Repository {name} is not defined in the repo list")]
    UnknownRepository { name: String },

    /// Neither the bundled nor the local instructions directory exists.
    #[error("No instructions found for {name} (searched: {})", display_paths(searched))]
    InstructionsNotFound { name: String, searched: Vec<PathBuf> },

    /// The instructions directory has no `fpm.json`.
    #[error("No FPM instructions {} found", path.display())]
    FpmConfigNotFound { path: PathBuf },

    /// `fpm.json` used a single-letter key, which fpm reserves for short flags.
    #[error("Found single letter option '{key}' in {} (short options are not allowed)", path.display())]
    InvalidOptionKey { key: String, path: PathBuf },

    /// An option value has a shape that cannot be turned into fpm arguments.
    #[error("Invalid value for option '{key}': {message}")]
    InvalidOptionValue { key: String, message: String },

    /// No version came from `fpm.json`, the repo list or the git reference.
    #[error("No version for {name}")]
    MissingVersion { name: String },

    /// An error occurred while cloning a Git repository.
    #[error("Git clone error for {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// An error occurred while executing a Git command in a working copy.
    #[error("Git command failed in {}: {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// The configured ref matches neither a tag nor a remote branch.
    #[error("Repository error for {name}: no matching tag or branch for {r#ref}")]
    UnresolvedReference { name: String, r#ref: String },

    /// A template referenced a placeholder the context does not define.
    #[error("Missing template placeholder '{placeholder}' in \"{template}\"")]
    MissingPlaceholder {
        placeholder: String,
        template: String,
    },

    /// A template string is malformed.
    #[error("Template processing error: {message}")]
    Template { message: String },

    /// fpm exited with a non-zero status.
    #[error("Failed to run {command} (exit code {}): {output}", exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    ExecutionFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    /// An external program could not be started at all.
    #[error("Failed to start {program}: {message}")]
    CommandSpawn { program: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
