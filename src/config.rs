//! # Repo List Configuration
//!
//! This module loads the repo list (`repos.json`), the JSON object naming
//! every repository to package:
//!
//! ```json
//! {
//!     "DEFAULT": {"fork": "acme", "templates": {"prefix": "/opt"}},
//!     "demo": {"ref": "v1.2.0", "ref_is_version": true}
//! }
//! ```
//!
//! The reserved `DEFAULT` entry is the base for every other entry. For each
//! repository the base is copied, the two `templates` mappings are unioned
//! (repository values win), the repository's own keys are laid over the
//! result, and `name` is set to the entry's key no matter what either entry
//! says. Repositories come out sorted by name.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::{GITHUB_GIT, REPOS_DEFAULT_KEY};
use crate::error::{Error, Result};
use crate::template::TemplateContext;

/// One repository to package, after merging with `DEFAULT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSpec {
    /// Repository name; always the key of the entry in the repo list.
    pub name: String,
    /// GitHub owner the repository is cloned from.
    #[serde(default)]
    pub fork: Option<String>,
    /// Tag or branch to check out. Tags are tried first.
    #[serde(default)]
    pub r#ref: Option<String>,
    /// Derive the package version from `ref` (a leading `v` is dropped).
    #[serde(default)]
    pub ref_is_version: bool,
    /// Explicit package version; `fpm.json` can still override it.
    #[serde(default)]
    pub version: Option<String>,
    /// Clone URL template, `https://github.com/{fork}/{name}` when unset.
    #[serde(default)]
    pub git_url: Option<String>,
    /// Extra values available to `{placeholder}`s in fpm option values.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

impl RepoSpec {
    /// Creates a spec with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fork: None,
            r#ref: None,
            ref_is_version: false,
            version: None,
            git_url: None,
            templates: BTreeMap::new(),
        }
    }

    /// Template data handed to the command synthesizer.
    pub fn template_context(&self) -> TemplateContext {
        self.templates.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    /// Values the clone URL template may reference.
    pub fn url_context(&self) -> TemplateContext {
        let mut context = TemplateContext::new();
        context.insert("name", self.name.as_str());
        if let Some(fork) = &self.fork {
            context.insert("fork", fork.as_str());
        }
        context
    }

    /// Clone URL template in effect for this repository.
    pub fn git_url_template(&self) -> &str {
        self.git_url.as_deref().unwrap_or(GITHUB_GIT)
    }
}

/// Loads and merges the repo list at `path`.
pub fn load_repo_list(path: &Path) -> Result<Vec<RepoSpec>> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_repo_list(&content, path)
}

/// Parses and merges repo list content. `source` names the file in errors.
pub fn parse_repo_list(content: &str, source: &Path) -> Result<Vec<RepoSpec>> {
    let load_error = |message: String| Error::ConfigLoad {
        path: source.to_path_buf(),
        message,
    };

    let value: Value = serde_json::from_str(content).map_err(|e| load_error(e.to_string()))?;
    let Value::Object(mut entries) = value else {
        return Err(load_error("expected a JSON object of repositories".to_string()));
    };

    let default = match entries.remove(REPOS_DEFAULT_KEY) {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(load_error(format!(
                "'{}' must be a JSON object",
                REPOS_DEFAULT_KEY
            )))
        }
        None => Map::new(),
    };

    let mut names: Vec<String> = entries.keys().cloned().collect();
    names.sort();

    let mut repos = Vec::with_capacity(names.len());
    for name in names {
        let entry = match entries.remove(&name) {
            Some(Value::Object(map)) => map,
            _ => return Err(load_error(format!("entry '{}' must be a JSON object", name))),
        };
        let merged = merge_entry(&default, entry, &name).map_err(load_error)?;
        let spec: RepoSpec = serde_json::from_value(Value::Object(merged))
            .map_err(|e| load_error(format!("entry '{}': {}", name, e)))?;
        repos.push(spec);
    }

    log::debug!("Got {} repos from {}", repos.len(), source.display());
    Ok(repos)
}

/// Keeps only the repositories named in `only`, in repo list order. An empty
/// filter keeps everything.
pub fn select_repos(repos: Vec<RepoSpec>, only: &[String]) -> Result<Vec<RepoSpec>> {
    if only.is_empty() {
        return Ok(repos);
    }
    if let Some(unknown) = only.iter().find(|n| !repos.iter().any(|r| &r.name == *n)) {
        return Err(Error::UnknownRepository {
            name: unknown.clone(),
        });
    }
    Ok(repos.into_iter().filter(|r| only.contains(&r.name)).collect())
}

fn merge_entry(
    default: &Map<String, Value>,
    mut entry: Map<String, Value>,
    name: &str,
) -> std::result::Result<Map<String, Value>, String> {
    let mut merged = default.clone();

    let mut templates = take_templates(&mut merged, REPOS_DEFAULT_KEY)?;
    for (key, value) in take_templates(&mut entry, name)? {
        templates.insert(key, value);
    }

    for (key, value) in entry {
        merged.insert(key, value);
    }
    merged.insert("name".to_string(), Value::String(name.to_string()));
    merged.insert("templates".to_string(), Value::Object(templates));
    Ok(merged)
}

/// Removes the `templates` mapping from an entry, turning scalar values into
/// strings.
fn take_templates(
    entry: &mut Map<String, Value>,
    owner: &str,
) -> std::result::Result<Map<String, Value>, String> {
    let templates = match entry.remove("templates") {
        None | Some(Value::Null) => return Ok(Map::new()),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(format!("'templates' of '{}' must be a JSON object", owner)),
    };

    templates
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(format!(
                        "template '{}' of '{}' must be a string, number or boolean",
                        key, owner
                    ))
                }
            };
            Ok((key, Value::String(text)))
        })
        .collect()
}
