//! List command implementation
//!
//! Shows every repository of the repo list as the build command will see it,
//! after `DEFAULT` has been merged in.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use repo_packager::config::{load_repo_list, RepoSpec};
use repo_packager::defaults::REPOS_JSON;
use repo_packager::output::OutputConfig;
use repo_packager::repository::clone_url;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Path to the repo list
    #[arg(short, long, value_name = "PATH", env = "REPO_PACKAGER_REPOS", default_value = REPOS_JSON)]
    pub repos: PathBuf,

    /// Print the merged entries as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the list command
pub fn execute(args: ListArgs, output: &OutputConfig) -> Result<()> {
    let repos = load_repo_list(&args.repos)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&repos)?);
        return Ok(());
    }

    for repo in &repos {
        print!("{}", describe(repo, output));
    }
    Ok(())
}

fn describe(repo: &RepoSpec, output: &OutputConfig) -> String {
    let mut text = format!("{}\n", output.repo_name(&repo.name));

    let url = clone_url(repo).unwrap_or_else(|e| format!("<{}>", e));
    text.push_str(&format!("  url: {}\n", url));

    if let Some(r) = &repo.r#ref {
        let note = if repo.ref_is_version {
            " (version from ref)"
        } else {
            ""
        };
        text.push_str(&format!("  ref: {}{}\n", r, note));
    }
    if let Some(version) = &repo.version {
        text.push_str(&format!("  version: {}\n", version));
    }
    if !repo.templates.is_empty() {
        let templates: Vec<String> = repo
            .templates
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        text.push_str(&format!("  templates: {}\n", templates.join(", ")));
    }
    text
}
