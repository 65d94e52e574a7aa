//! # Packaging Instructions
//!
//! Packaging instructions for a repository live in a directory holding an
//! `fpm.json` file and, optionally, lifecycle scripts named after the fpm
//! options they feed (`before-install`, `after-remove`, ...).
//!
//! Two places are searched, in order:
//!
//! 1. `packaging/` inside the repository's working copy, so a project can
//!    carry its own instructions;
//! 2. `instructions/<name>/` under the instructions root (the invocation
//!    directory unless configured otherwise).
//!
//! Gathering turns the directory into a complete `PackageSpec`: the options
//! from `fpm.json`, the lifecycle scripts found next to it, and defaults for
//! everything fpm needs but the file left out.

use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults::{
    BUNDLED_INSTRUCTIONS_DIR, DEFAULT_ARCH, DEFAULT_INPUT_TYPE, EXCLUDE_DEFAULT, FPM_JSON,
    LIFECYCLE_SCRIPTS, LOCAL_INSTRUCTIONS_DIR,
};
use crate::error::{Error, Result};
use crate::options::{OptionValue, PackageSpec, Scalar};
use crate::repository::Repository;

/// Returns the first existing instructions directory for `name`.
pub fn locate_instructions(
    name: &str,
    working_dir: &Path,
    instructions_root: &Path,
) -> Result<PathBuf> {
    let candidates = [
        working_dir.join(BUNDLED_INSTRUCTIONS_DIR),
        instructions_root.join(LOCAL_INSTRUCTIONS_DIR).join(name),
    ];

    for candidate in &candidates {
        if candidate.is_dir() {
            log::debug!("Instructions found at {}", candidate.display());
            return Ok(candidate.clone());
        }
        log::debug!("No instructions found at {}", candidate.display());
    }

    Err(Error::InstructionsNotFound {
        name: name.to_string(),
        searched: candidates.to_vec(),
    })
}

/// Loads and validates `fpm.json` from an instructions directory.
pub fn load_fpm_json(instructions_dir: &Path) -> Result<PackageSpec> {
    let path = instructions_dir.join(FPM_JSON);
    if !path.is_file() {
        return Err(Error::FpmConfigNotFound { path });
    }

    let content = fs::read_to_string(&path)?;
    let spec = PackageSpec::parse(&content, &path)?;
    spec.validate_keys(&path)?;
    Ok(spec)
}

/// Adds every lifecycle script present in `instructions_dir`, pointing the
/// option at the script's path.
pub fn add_lifecycle_scripts(spec: &mut PackageSpec, instructions_dir: &Path) {
    for script in LIFECYCLE_SCRIPTS {
        let path = instructions_dir.join(script);
        if path.is_file() {
            log::debug!("Found {} script {}", script, path.display());
            spec.set(*script, OptionValue::text(path.to_string_lossy()));
        }
    }
}

/// Makes `exclude` a list containing every default exclusion.
///
/// Existing patterns keep their order (and `exclude` its position) and
/// defaults already present are not repeated, so normalizing twice changes
/// nothing. Patterns are handed to fpm as written; only boolean entries are
/// rejected.
pub fn normalize_excludes(spec: &mut PackageSpec) -> Result<()> {
    let mut excludes = spec
        .get("exclude")
        .cloned()
        .map(OptionValue::into_list)
        .unwrap_or_default();

    if excludes.iter().any(|pattern| matches!(pattern, Scalar::Bool(_))) {
        return Err(Error::InvalidOptionValue {
            key: "exclude".to_string(),
            message: "exclude patterns must be strings".to_string(),
        });
    }

    for default in EXCLUDE_DEFAULT {
        let default = Scalar::text(*default);
        if !excludes.contains(&default) {
            excludes.push(default);
        }
    }

    spec.set("exclude", OptionValue::List(excludes));
    Ok(())
}

/// Builds the complete fpm options for repository `name`.
///
/// `version` is the version worked out while preparing the repository; a
/// `version` in `fpm.json` takes precedence over it.
pub fn gather_instructions(
    name: &str,
    repo: &Repository<'_>,
    instructions_root: &Path,
    version: Option<&str>,
) -> Result<PackageSpec> {
    let instructions_dir = locate_instructions(name, repo.working_dir(), instructions_root)?;
    let mut spec = load_fpm_json(&instructions_dir)?;

    add_lifecycle_scripts(&mut spec, &instructions_dir);

    if !spec.contains_key("iteration") {
        let commit = repo.head_commit()?;
        spec.set("iteration", OptionValue::text(commit.iteration()));
    }
    if !spec.contains_key("url") {
        spec.set("url", OptionValue::text(repo.remote_url()?));
    }
    spec.set_default("name", OptionValue::text(name));
    spec.set_default("architecture", OptionValue::text(DEFAULT_ARCH));
    spec.set_default("input-type", OptionValue::text(DEFAULT_INPUT_TYPE));

    normalize_excludes(&mut spec)?;

    if !spec.contains_key("version") {
        let version = version.ok_or_else(|| Error::MissingVersion {
            name: name.to_string(),
        })?;
        spec.set("version", OptionValue::text(version));
    }

    log::debug!(
        "Gathered fpm options {}",
        serde_json::to_string(&spec).unwrap_or_default()
    );
    Ok(spec)
}
