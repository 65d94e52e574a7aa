//! Default values for repo-packager.
//!
//! This module centralizes the fixed names and values the packaging pipeline
//! relies on, so the loader, the preparer, the gatherer and the CLI agree on
//! them.

use std::path::PathBuf;

/// Clone URL used when a repo entry does not set `git_url`.
pub const GITHUB_GIT: &str = "https://github.com/{fork}/{name}";

/// Remote every working copy is cloned from.
pub const REMOTE_NAME: &str = "origin";

/// Default name of the repo list file.
pub const REPOS_JSON: &str = "repos.json";

/// Reserved repo-list key holding values shared by every repository.
pub const REPOS_DEFAULT_KEY: &str = "DEFAULT";

/// Packaging instructions file name.
pub const FPM_JSON: &str = "fpm.json";

/// Instructions directory bundled inside a repository.
pub const BUNDLED_INSTRUCTIONS_DIR: &str = "packaging";

/// Directory under the instructions root holding one directory per repo.
pub const LOCAL_INSTRUCTIONS_DIR: &str = "instructions";

/// Subdirectory of the package area collecting all produced packages.
pub const PKG_SUBDIR: &str = "packages";

pub const DEFAULT_FPM: &str = "fpm";
pub const DEFAULT_PACKAGE_TYPE: &str = "rpm";
pub const DEFAULT_ARCH: &str = "noarch";
pub const DEFAULT_INPUT_TYPE: &str = "dir";

/// Key whose values become trailing positional arguments to fpm.
pub const ARGS_KEY: &str = "ARGS";

/// Exclude patterns added to every package.
pub const EXCLUDE_DEFAULT: &[&str] = &["*/.git*"];

/// Lifecycle scripts picked up from the instructions directory, in the order
/// they are added to the package options.
pub const LIFECYCLE_SCRIPTS: &[&str] = &[
    "before-install",
    "after-install",
    "before-remove",
    "after-remove",
    "before-upgrade",
    "after-upgrade",
];

/// Returns the default package area holding working copies and packages.
///
/// Uses the platform cache directory (`~/.cache/repo-packager` on Linux) and
/// falls back to `repo-packager` under the system temp directory.
///
/// This can be overridden by the `--package-area` CLI flag or the
/// `REPO_PACKAGER_AREA` environment variable.
pub fn default_package_area() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("repo-packager")
}
