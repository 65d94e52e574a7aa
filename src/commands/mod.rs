//! # CLI Command Implementations
//!
//! Each subcommand of `repo-packager` lives in its own module with:
//! - an `Args` struct deriving `clap::Args` for its options;
//! - an `execute` function taking the parsed arguments and calling into the
//!   `repo_packager` library.

pub mod build;
pub mod completions;
pub mod list;
