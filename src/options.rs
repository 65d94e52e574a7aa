//! # Package Options
//!
//! The packaging instructions for one repository are a flat, ordered set of
//! fpm options (`PackageSpec`). Each option value is a tagged union rather
//! than loose JSON:
//!
//! - `Scalar::Text` for strings (and numbers, kept as their JSON text),
//! - `Scalar::Bool` for switches that fpm receives as bare flags,
//! - `OptionValue::List` for options repeated once per element.
//!
//! Keys keep their insertion order so that the synthesized fpm command is
//! deterministic: keys from `fpm.json` first, in file order, followed by keys
//! added while gathering instructions.

use std::fmt;
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// A single option value element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    Bool(bool),
}

impl Scalar {
    pub fn text(value: impl Into<String>) -> Self {
        Scalar::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            Scalar::Bool(_) => None,
        }
    }

    fn from_json(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Scalar::Text(text.clone())),
            Value::Number(number) => Ok(Scalar::Text(number.to_string())),
            Value::Bool(flag) => Ok(Scalar::Bool(*flag)),
            Value::Null => Err(invalid(key, "null is not a valid option value")),
            Value::Array(_) => Err(invalid(key, "nested lists are not supported")),
            Value::Object(_) => Err(invalid(key, "objects are not supported")),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Bool(flag) => write!(f, "{}", flag),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Text(text) => serializer.serialize_str(text),
            Scalar::Bool(flag) => serializer.serialize_bool(*flag),
        }
    }
}

/// The value of one fpm option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Single(Scalar),
    List(Vec<Scalar>),
}

impl OptionValue {
    pub fn text(value: impl Into<String>) -> Self {
        OptionValue::Single(Scalar::text(value))
    }

    pub fn flag(value: bool) -> Self {
        OptionValue::Single(Scalar::Bool(value))
    }

    /// Converts a JSON value from `fpm.json` into an option value.
    pub fn from_json(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| Scalar::from_json(key, item))
                .collect::<Result<Vec<_>>>()
                .map(OptionValue::List),
            other => Scalar::from_json(key, other).map(OptionValue::Single),
        }
    }

    /// Elements of the value; a single value yields one element.
    pub fn elements(&self) -> &[Scalar] {
        match self {
            OptionValue::Single(scalar) => std::slice::from_ref(scalar),
            OptionValue::List(items) => items,
        }
    }

    /// Returns the value as a list, wrapping a single value.
    pub fn into_list(self) -> Vec<Scalar> {
        match self {
            OptionValue::Single(scalar) => vec![scalar],
            OptionValue::List(items) => items,
        }
    }

    /// Text used when the value is referenced from a template: lists are
    /// joined with `,`.
    pub fn context_text(&self) -> String {
        self.elements()
            .iter()
            .map(Scalar::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            OptionValue::Single(scalar) => scalar.serialize(serializer),
            OptionValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Ordered fpm options for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSpec {
    entries: Vec<(String, OptionValue)>,
}

impl PackageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the contents of an `fpm.json` file.
    ///
    /// The top level must be an object. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(content).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let Value::Object(map) = value else {
            return Err(Error::ConfigLoad {
                path: path.to_path_buf(),
                message: "expected a JSON object of fpm options".to_string(),
            });
        };

        let mut spec = Self::new();
        for (key, value) in &map {
            spec.set(key.clone(), OptionValue::from_json(key, value)?);
        }
        Ok(spec)
    }

    /// Rejects single-letter keys, which fpm reserves for short flags.
    pub fn validate_keys(&self, path: &Path) -> Result<()> {
        match self.keys().find(|key| key.chars().count() == 1) {
            Some(key) => Err(Error::InvalidOptionKey {
                key: key.to_string(),
                path: path.to_path_buf(),
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets a value in place if the key exists, otherwise appends it.
    pub fn set(&mut self, key: impl Into<String>, value: OptionValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Sets a value only when the key is absent. Returns the value in effect.
    pub fn set_default(&mut self, key: &str, value: OptionValue) -> &OptionValue {
        let index = match self.entries.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), value));
                self.entries.len() - 1
            }
        };
        &self.entries[index].1
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text of a single text value, if the key holds one.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            OptionValue::Single(scalar) => scalar.as_text(),
            OptionValue::List(_) => None,
        }
    }
}

impl Serialize for PackageSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn invalid(key: &str, message: &str) -> Error {
    Error::InvalidOptionValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
