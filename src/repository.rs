//! # Repository Preparation
//!
//! This module gets the working copy of a repository into the state the
//! package is built from: cloned (or reused), checked out at the configured
//! reference, and hard-reset so no local modification leaks into the package.
//!
//! ## Design
//!
//! Git access goes through the `GitOperations` trait. The application uses
//! `DefaultGitOperations`, which wraps the system `git` command from
//! `crate::git`; tests substitute a mock so reference resolution and version
//! derivation can be exercised without a real repository.
//!
//! ## Reference resolution
//!
//! A configured `ref` is looked up as a tag with the exact name first and as
//! the remote branch `origin/<ref>` second. The first match wins, so a tag
//! shadows a branch of the same name. A ref matching neither is an
//! `UnresolvedReference` error.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RepoSpec;
use crate::defaults::REMOTE_NAME;
use crate::error::{Error, Result};
use crate::git::{CommitInfo, GitRef, RefKind};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Clones `url` into `target_dir`.
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()>;

    /// Updates the remote branches and tags of an existing working copy.
    fn fetch(&self, repo_dir: &Path) -> Result<()>;

    /// Lists the tags and branches of a working copy.
    fn list_refs(&self, repo_dir: &Path) -> Result<Vec<GitRef>>;

    /// Checks out `full_ref` and hard-resets index and working tree to it.
    fn checkout(&self, repo_dir: &Path, full_ref: &str) -> Result<()>;

    /// Hard-resets index and working tree to the current HEAD.
    fn reset_hard(&self, repo_dir: &Path) -> Result<()>;

    fn head_commit(&self, repo_dir: &Path) -> Result<CommitInfo>;

    fn remote_url(&self, repo_dir: &Path) -> Result<String>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone(url, target_dir)
    }

    fn fetch(&self, repo_dir: &Path) -> Result<()> {
        crate::git::fetch(repo_dir)
    }

    fn list_refs(&self, repo_dir: &Path) -> Result<Vec<GitRef>> {
        crate::git::list_refs(repo_dir)
    }

    fn checkout(&self, repo_dir: &Path, full_ref: &str) -> Result<()> {
        crate::git::checkout(repo_dir, full_ref)
    }

    fn reset_hard(&self, repo_dir: &Path) -> Result<()> {
        crate::git::reset_hard(repo_dir, "HEAD")
    }

    fn head_commit(&self, repo_dir: &Path) -> Result<CommitInfo> {
        crate::git::head_commit(repo_dir)
    }

    fn remote_url(&self, repo_dir: &Path) -> Result<String> {
        crate::git::remote_url(repo_dir)
    }
}

/// A local working copy together with the git backend that manages it.
pub struct Repository<'g> {
    git: &'g dyn GitOperations,
    working_dir: PathBuf,
}

impl<'g> Repository<'g> {
    pub fn new(git: &'g dyn GitOperations, working_dir: PathBuf) -> Self {
        Self { git, working_dir }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn head_commit(&self) -> Result<CommitInfo> {
        self.git.head_commit(&self.working_dir)
    }

    pub fn remote_url(&self) -> Result<String> {
        self.git.remote_url(&self.working_dir)
    }
}

impl std::fmt::Debug for Repository<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("working_dir", &self.working_dir)
            .finish()
    }
}

/// Whether a reference resolved to a tag or a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefType {
    Tag,
    Branch,
}

impl std::fmt::Display for RefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefType::Tag => f.write_str("tag"),
            RefType::Branch => f.write_str("branch"),
        }
    }
}

/// A configured `ref` matched against the references of a working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub ref_type: RefType,
    /// The name as configured, e.g. `v1.2.0` or `master`.
    pub ref_name: String,
    /// Full git name checked out, e.g. `refs/remotes/origin/master`.
    pub full_name: String,
}

/// Options controlling how an existing working copy is reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Delete the working copy and clone it again.
    pub wipe: bool,
    /// Fetch from `origin` before resolving the reference when the working
    /// copy already exists.
    pub fetch: bool,
}

/// A working copy ready for packaging.
#[derive(Debug)]
pub struct PreparedRepo<'g> {
    pub repo: Repository<'g>,
    pub reference: Option<ResolvedRef>,
    /// Version to package, unless `fpm.json` sets one.
    pub version: Option<String>,
}

/// Finds `ref_name` among `refs`: a tag with that exact name first, then the
/// remote branch `origin/<ref_name>`.
pub fn resolve_reference(refs: &[GitRef], ref_name: &str) -> Option<ResolvedRef> {
    let branch_name = format!("{}/{}", REMOTE_NAME, ref_name);
    let candidates = [
        (RefType::Tag, RefKind::Tag, ref_name),
        (RefType::Branch, RefKind::RemoteBranch, branch_name.as_str()),
    ];

    for (ref_type, kind, wanted) in candidates {
        if let Some(found) = refs.iter().find(|r| r.kind == kind && r.name == wanted) {
            return Some(ResolvedRef {
                ref_type,
                ref_name: ref_name.to_string(),
                full_name: found.full_name.clone(),
            });
        }
        log::debug!("No {} named {} found", ref_type, wanted);
    }
    None
}

/// Version derived from a reference name: one leading `v` is dropped.
pub fn derive_version(ref_name: &str) -> String {
    ref_name.strip_prefix('v').unwrap_or(ref_name).to_string()
}

/// Clone URL of a repository, rendered from its `git_url` template.
pub fn clone_url(spec: &RepoSpec) -> Result<String> {
    spec.url_context().render(spec.git_url_template())
}

/// Working copy location of a repository inside the package area.
pub fn working_copy_path(package_area: &Path, name: &str) -> PathBuf {
    package_area.join(name)
}

/// Clones or reuses the working copy of `spec`, checks out its reference
/// and works out the version to package.
pub fn prepare_repository<'g>(
    git: &'g dyn GitOperations,
    spec: &RepoSpec,
    package_area: &Path,
    options: PrepareOptions,
) -> Result<PreparedRepo<'g>> {
    let repo_path = working_copy_path(package_area, &spec.name);
    let url = clone_url(spec)?;

    if options.wipe && repo_path.is_dir() {
        log::debug!("Wiping {}", repo_path.display());
        fs::remove_dir_all(&repo_path)?;
    }

    if repo_path.is_dir() {
        log::debug!(
            "Using existing repo {} url {} in {}",
            spec.name,
            url,
            repo_path.display()
        );
        if options.fetch {
            git.fetch(&repo_path)?;
        }
    } else {
        git.clone_repo(&url, &repo_path)?;
        log::debug!(
            "Cloned repo {} url {} in {}",
            spec.name,
            url,
            repo_path.display()
        );
    }

    let mut reference = None;
    let mut ref_version = None;
    match &spec.r#ref {
        Some(ref_name) => {
            let refs = git.list_refs(&repo_path)?;
            let resolved =
                resolve_reference(&refs, ref_name).ok_or_else(|| Error::UnresolvedReference {
                    name: spec.name.clone(),
                    r#ref: ref_name.clone(),
                })?;

            if spec.ref_is_version {
                ref_version = Some(derive_version(ref_name));
            }

            git.checkout(&repo_path, &resolved.full_name)?;
            log::debug!(
                "Switched to {} name {} ({}; ref_version {:?})",
                resolved.ref_type,
                ref_name,
                resolved.full_name,
                ref_version
            );
            reference = Some(resolved);
        }
        None => git.reset_hard(&repo_path)?,
    }

    let version = spec.version.clone().or(ref_version);
    Ok(PreparedRepo {
        repo: Repository::new(git, repo_path),
        reference,
        version,
    })
}
