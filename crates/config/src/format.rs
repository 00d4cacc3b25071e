//! Supported configuration formats and parsing into a value tree.
//!
//! Responsibilities:
//! - Map config type names and file extensions to a `ConfigFormat`.
//! - Parse configuration text into a `serde_json` object with lower-cased keys.
//!
//! Does NOT handle:
//! - Locating files or reading them from disk (see `store`).
//!
//! Invariants:
//! - Parsed documents are always objects; an empty document parses to `{}`.
//! - Keys are case-insensitive: every map key is folded to lowercase.

use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;

/// A configuration text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
    /// `KEY=value` lines, as in a `.env` file.
    Dotenv,
}

impl ConfigFormat {
    /// Every supported format, in the order used when no type is configured.
    pub const ALL: [ConfigFormat; 4] = [Self::Json, Self::Toml, Self::Yaml, Self::Dotenv];

    /// Canonical type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Dotenv => "env",
        }
    }

    /// File extensions recognized for this format, preferred first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Yaml => &["yaml", "yml"],
            Self::Toml => &["toml"],
            Self::Json => &["json"],
            Self::Dotenv => &["env"],
        }
    }

    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Parse `text` into an object with lower-cased keys.
    ///
    /// The error string is the underlying parser's message.
    pub fn parse(self, text: &str) -> Result<Map<String, Value>, String> {
        if text.trim().is_empty() {
            return Ok(Map::new());
        }

        let value = match self {
            Self::Yaml => serde_yaml::from_str::<Value>(text).map_err(|e| e.to_string())?,
            Self::Json => serde_json::from_str::<Value>(text).map_err(|e| e.to_string())?,
            Self::Toml => {
                let table = toml::from_str::<toml::Table>(text).map_err(|e| e.to_string())?;
                toml_to_json(toml::Value::Table(table))
            }
            Self::Dotenv => {
                let mut map = Map::new();
                for item in dotenvy::from_read_iter(text.as_bytes()) {
                    // Parse errors only report a position, never the line itself.
                    let (key, val) = item.map_err(|e| match e {
                        dotenvy::Error::LineParse(_, idx) => {
                            format!("invalid line at position {}", idx)
                        }
                        other => other.to_string(),
                    })?;
                    map.insert(key, Value::String(val));
                }
                Value::Object(map)
            }
        };

        match fold_keys(value) {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(format!(
                "top-level value must be a mapping, found {}",
                kind_of(&other)
            )),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "env" | "dotenv" => Ok(Self::Dotenv),
            _ => Err(ConfigError::UnsupportedConfigType(s.to_string())),
        }
    }
}

/// Recursively lower-case every object key.
pub(crate) fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), fold_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
