//! Thin wrappers around the system `git` command.
//!
//! Every function that works on an existing working copy takes its path and
//! runs `git -C <path>`, so the process working directory is never changed.
//! Using the system binary means SSH keys, credential helpers and anything
//! else configured in `~/.gitconfig` apply to clones and fetches.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use crate::defaults::REMOTE_NAME;
use crate::error::{Error, Result};

/// What kind of git reference a name is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Tag,
    LocalBranch,
    RemoteBranch,
}

/// A reference listed in a working copy.
///
/// `name` is the short name git shows for it: `v1.2.0` for a tag, `master`
/// for a local branch and `origin/master` for a remote branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    pub kind: RefKind,
    pub name: String,
    /// Full name, e.g. `refs/tags/v1.2.0`.
    pub full_name: String,
}

impl GitRef {
    /// Classifies a full reference name. Returns `None` for references that
    /// are neither tags nor branches (notes, stashes, `origin/HEAD`).
    pub fn from_full_name(full_name: &str) -> Option<Self> {
        let (kind, name) = if let Some(tag) = full_name.strip_prefix("refs/tags/") {
            (RefKind::Tag, tag)
        } else if let Some(head) = full_name.strip_prefix("refs/heads/") {
            (RefKind::LocalBranch, head)
        } else if let Some(remote) = full_name.strip_prefix("refs/remotes/") {
            if remote.ends_with("/HEAD") {
                return None;
            }
            (RefKind::RemoteBranch, remote)
        } else {
            return None;
        };

        Some(Self {
            kind,
            name: name.to_string(),
            full_name: full_name.to_string(),
        })
    }
}

/// The commit a working copy has checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Committer timestamp in seconds since the epoch.
    pub committed_date: i64,
    /// Full hexadecimal commit hash.
    pub hexsha: String,
}

impl CommitInfo {
    /// `<timestamp>.<first 8 hash characters>`, used as the package iteration.
    pub fn iteration(&self) -> String {
        let short: String = self.hexsha.chars().take(8).collect();
        format!("{}.{}", self.committed_date, short)
    }
}

/// Clone `url` into `target_dir`, creating parent directories as needed.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let output = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
            hint: Some("Make sure git is installed and on PATH".to_string()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Point at the usual suspects for auth failures
        let hint = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            Some(
                "Make sure you have access to the repository (SSH key, credential helper or access token)"
                    .to_string(),
            )
        } else {
            None
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message: stderr.trim().to_string(),
            hint,
        });
    }

    Ok(())
}

/// Fetch branches and tags from `origin`, pruning deleted branches.
pub fn fetch(repo_dir: &Path) -> Result<()> {
    run_git(repo_dir, &["fetch", "--tags", "--prune", REMOTE_NAME])?;
    Ok(())
}

/// List the tags and branches of a working copy.
pub fn list_refs(repo_dir: &Path) -> Result<Vec<GitRef>> {
    let stdout = run_git(repo_dir, &["for-each-ref", "--format=%(refname)"])?;
    Ok(stdout.lines().filter_map(GitRef::from_full_name).collect())
}

/// Detach HEAD at `full_ref` and hard-reset index and working tree to it.
pub fn checkout(repo_dir: &Path, full_ref: &str) -> Result<()> {
    run_git(repo_dir, &["checkout", "--force", "--detach", full_ref])?;
    reset_hard(repo_dir, full_ref)
}

/// Hard-reset index and working tree to `target`, discarding local changes.
pub fn reset_hard(repo_dir: &Path, target: &str) -> Result<()> {
    run_git(repo_dir, &["reset", "--hard", target])?;
    Ok(())
}

/// Timestamp and hash of the checked out commit.
pub fn head_commit(repo_dir: &Path) -> Result<CommitInfo> {
    let stdout = run_git(repo_dir, &["log", "-1", "--format=%ct %H"])?;
    parse_commit_line(stdout.trim()).ok_or_else(|| Error::GitCommand {
        command: "log -1".to_string(),
        path: repo_dir.to_path_buf(),
        stderr: format!("unexpected output: {}", stdout.trim()),
    })
}

/// URL of the `origin` remote.
pub fn remote_url(repo_dir: &Path) -> Result<String> {
    let stdout = run_git(repo_dir, &["remote", "get-url", REMOTE_NAME])?;
    Ok(stdout.trim().to_string())
}

fn parse_commit_line(line: &str) -> Option<CommitInfo> {
    let (timestamp, hash) = line.split_once(' ')?;
    Some(CommitInfo {
        committed_date: timestamp.parse().ok()?,
        hexsha: hash.to_string(),
    })
}

fn run_git(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let command = args.join(" ");
    let output: Output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            path: repo_dir.to_path_buf(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            path: repo_dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
