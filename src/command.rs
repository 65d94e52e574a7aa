//! # fpm Command Synthesis
//!
//! This module turns a gathered `PackageSpec` into an fpm invocation and runs
//! it.
//!
//! Every command starts with the same base flags (`--force --verbose
//! --template-scripts --output-type <type> --package <dir>`). Each option
//! then contributes arguments according to its rule:
//!
//! | Key            | Rule            | Result                                |
//! |----------------|-----------------|---------------------------------------|
//! | `ARGS`         | positional      | values appended after all flags       |
//! | `user`/`group` | type-qualified  | renamed to `<type>-user`/`<type>-group` |
//! | anything else  | flag            | `--<key> <value>` per element         |
//!
//! Boolean elements become a bare `--<key>` when true and nothing when
//! false. Text elements are rendered against the template context (the
//! repository's `templates` overlaid by the package options) before use.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::defaults::{ARGS_KEY, DEFAULT_FPM, DEFAULT_PACKAGE_TYPE, PKG_SUBDIR};
use crate::error::{Error, Result};
use crate::options::{PackageSpec, Scalar};
use crate::template::TemplateContext;

/// How an option key is turned into fpm arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionRule {
    /// `--<key> <value>` for each element.
    Flag,
    /// Values become trailing positional arguments.
    Positional,
    /// Renamed to `<package-type>-<key>` before flags are built.
    TypeQualified,
}

const OPTION_RULES: &[(&str, OptionRule)] = &[
    (ARGS_KEY, OptionRule::Positional),
    ("user", OptionRule::TypeQualified),
    ("group", OptionRule::TypeQualified),
];

/// Rule for `key`; keys without an entry in the table are plain flags.
pub fn option_rule(key: &str) -> OptionRule {
    OPTION_RULES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rule)| *rule)
        .unwrap_or(OptionRule::Flag)
}

/// Where and how fpm is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpmSettings {
    /// Program to execute.
    pub program: String,
    /// fpm output type, e.g. `rpm` or `deb`.
    pub package_type: String,
    /// Directory collecting the produced packages.
    pub output_dir: PathBuf,
}

impl FpmSettings {
    /// Default settings writing packages to `<package_area>/packages`.
    pub fn new(package_area: &Path) -> Self {
        Self {
            program: DEFAULT_FPM.to_string(),
            package_type: DEFAULT_PACKAGE_TYPE.to_string(),
            output_dir: package_area.join(PKG_SUBDIR),
        }
    }
}

/// Template context for one package: `templates` overlaid by the options.
pub fn template_context(spec: &PackageSpec, templates: &TemplateContext) -> TemplateContext {
    let mut context = templates.clone();
    context.extend(spec.iter().map(|(key, value)| (key, value.context_text())));
    context
}

/// Renames type-qualified options (`user` → `rpm-user`). An existing
/// qualified option is replaced in place, otherwise the renamed option moves
/// to the end.
pub fn qualify_options(spec: &mut PackageSpec, package_type: &str) {
    for (key, rule) in OPTION_RULES {
        if *rule != OptionRule::TypeQualified {
            continue;
        }
        if let Some(value) = spec.remove(key) {
            spec.set(format!("{}-{}", package_type, key), value);
        }
    }
}

/// A fully synthesized fpm invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpmCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl FpmCommand {
    /// Builds the command line for `spec`.
    ///
    /// `templates` is the repository's template data; option values take
    /// precedence over it when both define a key.
    pub fn synthesize(
        spec: &PackageSpec,
        templates: &TemplateContext,
        settings: &FpmSettings,
    ) -> Result<Self> {
        let context = template_context(spec, templates);

        let mut args: Vec<String> = vec![
            "--force".to_string(),
            "--verbose".to_string(),
            "--template-scripts".to_string(),
            "--output-type".to_string(),
            settings.package_type.clone(),
            "--package".to_string(),
            settings.output_dir.to_string_lossy().into_owned(),
        ];

        let mut options = spec.clone();
        qualify_options(&mut options, &settings.package_type);

        let mut positional = Vec::new();
        for (key, value) in options.iter() {
            let flag = format!("--{}", key);
            let rule = option_rule(key);
            for element in value.elements() {
                match element {
                    Scalar::Bool(true) => args.push(flag.clone()),
                    Scalar::Bool(false) => {}
                    Scalar::Text(text) => {
                        let rendered = context.render(text)?;
                        if rule == OptionRule::Positional {
                            positional.push(rendered);
                        } else {
                            args.push(flag.clone());
                            args.push(rendered);
                        }
                    }
                }
            }
        }

        args.extend(positional);
        Ok(Self {
            program: settings.program.clone(),
            args,
        })
    }

    /// Runs the command in `working_dir` and returns its combined output
    /// (stdout followed by stderr).
    pub fn execute(&self, working_dir: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(working_dir)
            .output()
            .map_err(|e| Error::CommandSpawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            let exit_code = output.status.code();
            log::error!(
                "Failed to run {} with exit code {:?} and output {}",
                self.program,
                exit_code,
                combined
            );
            return Err(Error::ExecutionFailed {
                command: self.to_string(),
                exit_code,
                output: combined,
            });
        }

        log::debug!("Ran {} in {} with output {}", self, working_dir.display(), combined);
        Ok(combined)
    }
}

impl fmt::Display for FpmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quotes `arg` for display when a shell would split or expand it.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Result of one fpm run.
#[derive(Debug, Clone)]
pub struct FpmRun {
    pub command: FpmCommand,
    /// Combined output of fpm; `None` on a dry run.
    pub output: Option<String>,
}

/// Synthesizes the fpm command for `spec` and runs it in `working_dir`,
/// creating the package output directory first. A dry run stops after
/// synthesis.
pub fn run_fpm(
    spec: &PackageSpec,
    templates: &TemplateContext,
    settings: &FpmSettings,
    working_dir: &Path,
    dry_run: bool,
) -> Result<FpmRun> {
    if !settings.output_dir.exists() {
        fs::create_dir_all(&settings.output_dir)?;
    }

    let command = FpmCommand::synthesize(spec, templates, settings)?;
    if dry_run {
        log::info!("Dry run, not executing: {}", command);
        return Ok(FpmRun {
            command,
            output: None,
        });
    }

    let output = command.execute(working_dir)?;
    Ok(FpmRun {
        command,
        output: Some(output),
    })
}
