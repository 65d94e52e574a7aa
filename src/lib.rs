//! # Repo Packager Library
//!
//! This library builds distribution packages from a set of git repositories
//! with [fpm](https://fpm.readthedocs.io). It backs the `repo-packager`
//! command-line tool but can be driven directly as well.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use repo_packager::command::{FpmCommand, FpmSettings};
//! use repo_packager::config;
//! use repo_packager::options::PackageSpec;
//!
//! let repos = config::parse_repo_list(
//!     r#"{"DEFAULT": {"fork": "acme"}, "demo": {"ref": "v1.2.0", "ref_is_version": true}}"#,
//!     Path::new("repos.json"),
//! )
//! .unwrap();
//! assert_eq!(repos[0].name, "demo");
//!
//! let spec = PackageSpec::parse(
//!     r#"{"name": "demo", "version": "1.2.0", "provides": "pkg-{name}"}"#,
//!     Path::new("fpm.json"),
//! )
//! .unwrap();
//! let settings = FpmSettings::new(Path::new("/tmp/area"));
//! let command = FpmCommand::synthesize(&spec, &repos[0].template_context(), &settings).unwrap();
//! assert!(command.args.contains(&"pkg-demo".to_string()));
//! ```
//!
//! ## Core Concepts
//!
//! - **Repo list (`config`)**: the `repos.json` file naming every repository,
//!   merged with its `DEFAULT` entry.
//! - **Repository preparation (`repository`, `git`)**: cloning, reference
//!   resolution (tags before branches) and version derivation.
//! - **Instructions (`instructions`, `options`)**: the `fpm.json` options plus
//!   lifecycle scripts and defaults, as an ordered `PackageSpec`.
//! - **Command synthesis (`command`, `template`)**: turning a `PackageSpec`
//!   into fpm arguments with `{placeholder}` templating.
//! - **Orchestration (`packager`)**: running all of the above for every
//!   repository, in order, stopping at the first error.

pub mod command;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod instructions;
pub mod options;
pub mod output;
pub mod packager;
pub mod repository;
pub mod template;

#[cfg(test)]
mod proptests;
