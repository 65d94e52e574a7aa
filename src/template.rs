//! # Template Context
//!
//! Option values in `fpm.json` and the clone URL may reference other values
//! with `{placeholder}` syntax, e.g. `"pkg-{name}"`. A `TemplateContext` holds
//! the values placeholders resolve against.
//!
//! Rendering is two-step: the template is parsed into literal and placeholder
//! segments, every placeholder is checked against the context, and only then
//! is the output assembled. A placeholder with no value is reported as
//! `Error::MissingPlaceholder`; malformed braces are `Error::Template`.
//!
//! `{{` and `}}` produce literal braces.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

const TOKEN_PATTERN: &str = r"\{\{|\}\}|\{([^{}]*)\}|\{|\}";

static TOKENS: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN));

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Values available to `{placeholder}` substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the placeholder names referenced by `template`, in order of
    /// appearance.
    pub fn placeholders(template: &str) -> Result<Vec<String>> {
        Ok(parse(template)?
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.to_string()),
                Segment::Literal(_) => None,
            })
            .collect())
    }

    /// Checks that every placeholder in `template` has a value.
    pub fn check(&self, template: &str) -> Result<()> {
        self.check_segments(template, &parse(template)?)
    }

    /// Substitutes every placeholder in `template`.
    pub fn render(&self, template: &str) -> Result<String> {
        let segments = parse(template)?;
        self.check_segments(template, &segments)?;

        let mut rendered = String::with_capacity(template.len());
        for segment in segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => {
                    // presence checked above
                    if let Some(value) = self.values.get(name) {
                        rendered.push_str(value);
                    }
                }
            }
        }
        Ok(rendered)
    }

    fn check_segments(&self, template: &str, segments: &[Segment<'_>]) -> Result<()> {
        for segment in segments {
            if let Segment::Placeholder(name) = segment {
                if !self.values.contains_key(*name) {
                    return Err(Error::MissingPlaceholder {
                        placeholder: name.to_string(),
                        template: template.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        context.extend(iter);
        context
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for TemplateContext {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>> {
    let tokens = TOKENS.as_ref().map_err(|e| Error::Regex(e.clone()))?;
    let mut segments = Vec::new();
    let mut last = 0;

    for captures in tokens.captures_iter(template) {
        let Some(token) = captures.get(0) else {
            continue;
        };
        if token.start() > last {
            segments.push(Segment::Literal(&template[last..token.start()]));
        }
        last = token.end();

        match token.as_str() {
            "{{" => segments.push(Segment::Literal("{")),
            "}}" => segments.push(Segment::Literal("}")),
            "{" | "}" => {
                return Err(Error::Template {
                    message: format!(
                        "Unmatched '{}' at offset {} in \"{}\"",
                        token.as_str(),
                        token.start(),
                        template
                    ),
                });
            }
            _ => {
                let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                if name.is_empty() {
                    return Err(Error::Template {
                        message: format!("Empty placeholder in \"{}\"", template),
                        });
                }
                segments.push(Segment::Placeholder(name));
            }
        }
    }

    if last < template.len() {
        segments.push(Segment::Literal(&template[last..]));
    }
    Ok(segments)
}
