//! Shared test utilities for the CLI end-to-end tests.
//!
//! Provides a `TestFixture` holding a temporary invocation directory with a
//! repo list and instructions, plus helpers creating local git repositories
//! to clone from and a stub fpm that records how it was called.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new()
//!     .with_repos(r#"{"demo": {"fork": "acme"}}"#)
//!     .with_instructions("demo", r#"{"version": "1.0"}"#);
//! fixture.command().arg("list").assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, OriginRepo};
    pub use super::TestFixture;
}

/// Whether a usable `git` binary is on PATH.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A temporary invocation directory for `repo-packager`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `repos.json` with the given content.
    pub fn with_repos(self, content: &str) -> Self {
        self.with_file("repos.json", content)
    }

    /// Write `instructions/<name>/fpm.json`.
    pub fn with_instructions(self, name: &str, fpm_json: &str) -> Self {
        self.with_file(&format!("instructions/{}/fpm.json", name), fpm_json)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Package area used by `build_command`.
    pub fn package_area(&self) -> PathBuf {
        self.path().join("area")
    }

    /// Create a command running in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-packager");
        cmd.current_dir(self.path())
            .env_remove("REPO_PACKAGER_REPOS")
            .env_remove("REPO_PACKAGER_AREA")
            .env_remove("REPO_PACKAGER_FPM")
            .env_remove("RUST_LOG");
        cmd
    }

    /// A `build` command with the package area inside the fixture.
    pub fn build_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("build")
            .arg("--color")
            .arg("never")
            .arg("--package-area")
            .arg(self.package_area());
        cmd
    }

    /// Install a stub fpm recording its arguments (one per line) and working
    /// directory, exiting with `exit_code`. Returns the script path.
    #[cfg(unix)]
    pub fn fake_fpm(&self, exit_code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = self.path().join("fake-fpm");
        let log = self.fpm_log();
        let content = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{log}'\npwd > '{log}.pwd'\necho 'Created package'\nexit {code}\n",
            log = log.display(),
            code = exit_code
        );
        std::fs::write(&script, content).expect("Failed to write fake fpm");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake fpm executable");
        script
    }

    /// File the stub fpm writes its arguments to.
    pub fn fpm_log(&self) -> PathBuf {
        self.path().join("fpm-args.log")
    }

    /// Recorded arguments, or `None` when fpm never ran.
    pub fn fpm_args(&self) -> Option<Vec<String>> {
        let content = std::fs::read_to_string(self.fpm_log()).ok()?;
        Some(content.lines().map(str::to_string).collect())
    }

    /// Working directory the stub fpm ran in.
    pub fn fpm_pwd(&self) -> Option<PathBuf> {
        let path = format!("{}.pwd", self.fpm_log().display());
        std::fs::read_to_string(path)
            .ok()
            .map(|s| PathBuf::from(s.trim()))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A local git repository standing in for a GitHub remote.
#[allow(dead_code)]
pub struct OriginRepo {
    pub path: PathBuf,
}

#[allow(dead_code)]
impl OriginRepo {
    /// Create a repository at `path` with an initial commit on `master`.
    pub fn init(path: &Path) -> Self {
        std::fs::create_dir_all(path).expect("Failed to create origin directory");
        let repo = Self {
            path: path.to_path_buf(),
        };
        repo.git(&["init", "--quiet"]);
        repo.git(&["checkout", "--quiet", "-b", "master"]);
        repo.git(&["config", "user.email", "packager@example.com"]);
        repo.git(&["config", "user.name", "Packager Test"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.commit_file("README.md", "demo\n", "initial commit");
        repo
    }

    /// Write a file and commit it.
    pub fn commit_file(&self, file: &str, content: &str, message: &str) {
        let target = self.path.join(file);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(target, content).expect("Failed to write file");
        self.git(&["add", file]);
        self.git(&["commit", "--quiet", "-m", message]);
    }

    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    pub fn branch(&self, name: &str) {
        self.git(&["branch", name]);
    }

    fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
