//! Status line styling for the CLI.
//!
//! Packaging reports get an emoji and a bold repository name on a color
//! terminal and a plain `[TAG]` prefix otherwise. `--color` decides first;
//! in `auto` mode `NO_COLOR`, `CLICOLOR`, `CLICOLOR_FORCE` and `TERM=dumb`
//! are consulted before asking the terminal (see <https://no-color.org/>).

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolves `--color` (`always`, `never`, anything else meaning auto)
    /// against the process environment and the stdout terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => color_from_env(
                |name| env::var_os(name).map(|v| v.to_string_lossy().into_owned()),
                console::Term::stdout().features().colors_supported(),
            ),
        };
        Self { use_color }
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Repository name as shown in status lines.
    pub fn repo_name(&self, name: &str) -> String {
        if self.use_color {
            console::style(name).bold().force_styling(true).to_string()
        } else {
            name.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Auto color detection. `NO_COLOR` (even empty) and `CLICOLOR=0` always
/// win, then `CLICOLOR_FORCE`, then `TERM=dumb`, then the terminal itself.
fn color_from_env(var: impl Fn(&str) -> Option<String>, terminal_colors: bool) -> bool {
    if var("NO_COLOR").is_some() || var("CLICOLOR").as_deref() == Some("0") {
        return false;
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if var("TERM").as_deref() == Some("dumb") {
        return false;
    }
    terminal_colors
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn detect(vars: &[(&str, &str)], terminal_colors: bool) -> bool {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        color_from_env(|name| vars.get(name).cloned(), terminal_colors)
    }

    #[test]
    fn test_flag_overrides_detection() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
        assert!(!OutputConfig::from_env_and_flag("NEVER").use_color);
    }

    #[test]
    fn test_detection_follows_terminal_by_default() {
        assert!(detect(&[], true));
        assert!(!detect(&[], false));
    }

    #[test]
    fn test_no_color_and_clicolor_disable() {
        assert!(!detect(&[("NO_COLOR", "")], true));
        assert!(!detect(&[("CLICOLOR", "0")], true));
        assert!(!detect(&[("NO_COLOR", "1"), ("CLICOLOR_FORCE", "1")], true));
    }

    #[test]
    fn test_clicolor_force_enables_without_terminal() {
        assert!(detect(&[("CLICOLOR_FORCE", "1")], false));
        assert!(!detect(&[("CLICOLOR_FORCE", "0")], false));
        assert!(detect(&[("CLICOLOR_FORCE", "1"), ("TERM", "dumb")], false));
    }

    #[test]
    fn test_dumb_terminal_disables() {
        assert!(!detect(&[("TERM", "dumb")], true));
    }

    #[test]
    fn test_emoji_helper() {
        assert_eq!(emoji(&OutputConfig::with_color(), "📦", "[PKG]"), "📦");
        assert_eq!(emoji(&OutputConfig::without_color(), "📦", "[PKG]"), "[PKG]");
    }

    #[test]
    fn test_repo_name_styling() {
        assert_eq!(OutputConfig::without_color().repo_name("demo"), "demo");
        let styled = OutputConfig::with_color().repo_name("demo");
        assert!(styled.contains("demo"));
        assert_ne!(styled, "demo");
    }
}
