//! Build command implementation
//!
//! The build command runs the packaging pipeline for every repository in the
//! repo list (or the ones selected with `--only`):
//! 1. Clone or reuse the working copy and check out the configured ref
//! 2. Gather fpm options from the instructions directory
//! 3. Synthesize the fpm command and run it inside the working copy

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use repo_packager::config::{load_repo_list, select_repos};
use repo_packager::defaults::{default_package_area, DEFAULT_FPM, DEFAULT_PACKAGE_TYPE, REPOS_JSON};
use repo_packager::output::{emoji, OutputConfig};
use repo_packager::packager::{PackageOutcome, Packager, PackagerSettings};
use repo_packager::repository::PrepareOptions;

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the repo list
    #[arg(short, long, value_name = "PATH", env = "REPO_PACKAGER_REPOS", default_value = REPOS_JSON)]
    pub repos: PathBuf,

    /// Directory containing instructions/<name>/ (defaults to current directory)
    #[arg(long, value_name = "PATH")]
    pub instructions_root: Option<PathBuf>,

    /// Directory holding working copies and built packages
    #[arg(long, value_name = "PATH", env = "REPO_PACKAGER_AREA")]
    pub package_area: Option<PathBuf>,

    /// fpm output package type
    #[arg(long, value_name = "TYPE", default_value = DEFAULT_PACKAGE_TYPE)]
    pub package_type: String,

    /// fpm program to run
    #[arg(long, value_name = "PROGRAM", env = "REPO_PACKAGER_FPM", default_value = DEFAULT_FPM)]
    pub fpm: String,

    /// Delete existing working copies and clone them again
    #[arg(long)]
    pub wipe: bool,

    /// Fetch from origin before checking out an existing working copy
    #[arg(long)]
    pub fetch: bool,

    /// Print the fpm commands without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Only package the named repository (repeatable)
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the build command
pub fn execute(args: BuildArgs, output: &OutputConfig) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let repos = load_repo_list(&args.repos)?;
    let repos = select_repos(repos, &args.only)?;

    // fpm runs inside each working copy, so every path it sees must be absolute
    let package_area = absolute(args.package_area.unwrap_or_else(default_package_area), &cwd);
    let instructions_root = absolute(args.instructions_root.unwrap_or_else(|| cwd.clone()), &cwd);

    let mut settings = PackagerSettings::new(package_area, instructions_root);
    settings.fpm.program = args.fpm;
    settings.fpm.package_type = args.package_type;
    settings.prepare = PrepareOptions {
        wipe: args.wipe,
        fetch: args.fetch,
    };
    settings.dry_run = args.dry_run;

    let packager = Packager::new(settings);
    match packager.run(&repos) {
        Ok(outcomes) => {
            if !args.quiet {
                for outcome in &outcomes {
                    report(outcome, output, args.dry_run);
                }
                if outcomes.is_empty() {
                    println!("No repositories to package");
                } else if !args.dry_run {
                    println!(
                        "   Packages written to: {}",
                        packager.settings().fpm.output_dir.display()
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            if !args.quiet {
                println!("{} Build failed", emoji(output, "❌", "[FAIL]"));
            }
            Err(e.into())
        }
    }
}

fn report(outcome: &PackageOutcome, output: &OutputConfig, dry_run: bool) {
    let reference = outcome
        .reference
        .as_ref()
        .map(|r| format!(" from {} {}", r.ref_type, r.ref_name))
        .unwrap_or_default();

    if dry_run {
        println!(
            "{} {} {}{}",
            emoji(output, "🔎", "[DRY]"),
            output.repo_name(&outcome.name),
            outcome.version().unwrap_or("?"),
            reference
        );
        println!("   {}", outcome.run.command);
    } else {
        println!(
            "{} Packaged {} {}{}",
            emoji(output, "📦", "[PKG]"),
            output.repo_name(&outcome.name),
            outcome.version().unwrap_or("?"),
            reference
        );
    }
}

fn absolute(path: PathBuf, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
