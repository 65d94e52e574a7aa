//! # Packaging Orchestrator
//!
//! The `Packager` drives the whole pipeline for each repository in turn:
//!
//! 1. **Prepare**: clone or reuse the working copy and check out its
//!    reference (`repository`).
//! 2. **Gather**: build the fpm options from the instructions directory
//!    (`instructions`).
//! 3. **Synthesize and run**: build the fpm command and run it inside the
//!    working copy (`command`).
//!
//! Repositories are processed one at a time in name order, and the run stops
//! at the first error. Working directories are always passed explicitly, so
//! nothing leaks from one repository into the next. fpm runs inside each
//! working copy, so relative roots are resolved against the current
//! directory before anything runs.

use std::path::{Path, PathBuf};

use crate::command::{run_fpm, FpmRun, FpmSettings};
use crate::config::RepoSpec;
use crate::error::Result;
use crate::instructions::gather_instructions;
use crate::options::PackageSpec;
use crate::repository::{
    prepare_repository, DefaultGitOperations, GitOperations, PrepareOptions, ResolvedRef,
};

/// Everything the packager needs besides the repo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerSettings {
    /// Holds one working copy per repository and the package output directory.
    pub package_area: PathBuf,
    /// Directory containing `instructions/<name>/`.
    pub instructions_root: PathBuf,
    pub fpm: FpmSettings,
    pub prepare: PrepareOptions,
    /// Synthesize fpm commands without running them.
    pub dry_run: bool,
}

impl PackagerSettings {
    /// Relative paths are resolved against the current directory.
    pub fn new(package_area: PathBuf, instructions_root: PathBuf) -> Self {
        let package_area = absolute(package_area);
        Self {
            fpm: FpmSettings::new(&package_area),
            package_area,
            instructions_root: absolute(instructions_root),
            prepare: PrepareOptions::default(),
            dry_run: false,
        }
    }

    /// Resolves every directory against the current directory.
    fn into_absolute(mut self) -> Self {
        self.package_area = absolute(self.package_area);
        self.instructions_root = absolute(self.instructions_root);
        self.fpm.output_dir = absolute(self.fpm.output_dir);
        self
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::path::absolute(&path).unwrap_or_else(|_| Path::new(".").join(path))
}

/// What was built for one repository.
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub name: String,
    pub reference: Option<ResolvedRef>,
    /// The fpm options the command was synthesized from.
    pub spec: PackageSpec,
    pub run: FpmRun,
}

impl PackageOutcome {
    pub fn version(&self) -> Option<&str> {
        self.spec.text("version")
    }
}

/// Runs the packaging pipeline over a set of repositories.
pub struct Packager {
    git: Box<dyn GitOperations>,
    settings: PackagerSettings,
}

impl Packager {
    /// Creates a packager using the system `git` command.
    pub fn new(settings: PackagerSettings) -> Self {
        Self::with_git_operations(Box::new(DefaultGitOperations), settings)
    }

    /// Creates a packager with a custom git backend.
    pub fn with_git_operations(git: Box<dyn GitOperations>, settings: PackagerSettings) -> Self {
        Self {
            git,
            settings: settings.into_absolute(),
        }
    }

    pub fn settings(&self) -> &PackagerSettings {
        &self.settings
    }

    /// Prepares, gathers and packages a single repository.
    pub fn make_package(&self, spec: &RepoSpec) -> Result<PackageOutcome> {
        log::debug!("Start make_package for repo {} ({:?})", spec.name, spec);

        let prepared = prepare_repository(
            self.git.as_ref(),
            spec,
            &self.settings.package_area,
            self.settings.prepare,
        )?;

        let options = gather_instructions(
            &spec.name,
            &prepared.repo,
            &self.settings.instructions_root,
            prepared.version.as_deref(),
        )?;

        let run = run_fpm(
            &options,
            &spec.template_context(),
            &self.settings.fpm,
            prepared.repo.working_dir(),
            self.settings.dry_run,
        )?;

        log::info!(
            "Packaged {} version {}",
            spec.name,
            options.text("version").unwrap_or("?")
        );

        Ok(PackageOutcome {
            name: spec.name.clone(),
            reference: prepared.reference,
            spec: options,
            run,
        })
    }

    /// Packages every repository in name order, stopping at the first error.
    pub fn run(&self, repos: &[RepoSpec]) -> Result<Vec<PackageOutcome>> {
        let mut ordered: Vec<&RepoSpec> = repos.iter().collect();
        ordered.sort_by(|a, b| a.name.cmp(&b.name));

        let mut outcomes = Vec::with_capacity(ordered.len());
        for spec in ordered {
            outcomes.push(self.make_package(spec)?);
        }
        Ok(outcomes)
    }
}
