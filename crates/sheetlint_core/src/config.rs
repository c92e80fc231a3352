//! Configuration data model.
//!
//! A [`Config`] is what a configuration file, a shareable config, an inline
//! `extends` entry or an override fragment deserializes into. JSON keys are
//! camelCase, and the fields that accept a single value or a list in JSON are
//! always lists here.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use jsonc_parser::ParseOptions;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use sheetlint_plugin::{Plugin, Severity};

use crate::LinterError;

pub(crate) const OVERRIDES_NOT_ARRAY: &str = "The `overrides` configuration property should be an array, e.g. { \"overrides\": [{ \"files\": \"*.css\", \"rules\": {} }] }.";

pub(crate) const OVERRIDE_WITHOUT_FILES: &str = "Every object in the `overrides` configuration property should have a `files` property with globs, e.g. { \"overrides\": [{ \"files\": \"*.css\", \"rules\": {} }] }.";

/// A configuration fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Configurations this one builds on, applied in order.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub extends: Vec<ExtendsEntry>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub plugins: Vec<PluginEntry>,

    /// File-scoped fragments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Override>,

    /// Rule name to raw settings. `null` turns a rule off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<IndexMap<String, Value>>,

    /// Globs of inputs to skip.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "one_or_many_opt"
    )]
    pub ignore_files: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_disables: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_needless_disables: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_invalid_scope_disables: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_descriptionless_disables: Option<Value>,

    /// Name of a registered parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_syntax: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_severity: Option<Severity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty_input: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
}

/// One `extends` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtendsEntry {
    /// Shareable config name or path.
    Lookup(String),
    Inline(Box<Config>),
}

impl From<&str> for ExtendsEntry {
    fn from(lookup: &str) -> Self {
        Self::Lookup(lookup.to_string())
    }
}

impl From<Config> for ExtendsEntry {
    fn from(config: Config) -> Self {
        Self::Inline(Box::new(config))
    }
}

/// One `plugins` entry.
#[derive(Debug, Clone)]
pub enum PluginEntry {
    /// Catalog specifier. Path-like specifiers are absolutized during
    /// augmentation.
    Lookup(String),
    /// A plugin handed over directly.
    Resolved(Arc<Plugin>),
}

impl PartialEq for PluginEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Lookup(a), Self::Lookup(b)) => a == b,
            (Self::Resolved(a), Self::Resolved(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for PluginEntry {
    fn from(specifier: &str) -> Self {
        Self::Lookup(specifier.to_string())
    }
}

impl From<Plugin> for PluginEntry {
    fn from(plugin: Plugin) -> Self {
        Self::Resolved(Arc::new(plugin))
    }
}

impl fmt::Display for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup(specifier) => f.write_str(specifier),
            Self::Resolved(plugin) => f.write_str(&plugin.name),
        }
    }
}

impl Serialize for PluginEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PluginEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Lookup)
    }
}

/// A fragment applied only to inputs matching `files`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Override {
    #[serde(default, deserialize_with = "one_or_many")]
    pub files: Vec<String>,

    #[serde(flatten)]
    pub config: Config,
}

impl Override {
    pub fn new<I, S>(files: I, config: Config) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            config,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::deserialize(deserializer).map(Into::into)
}

fn one_or_many_opt<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<OneOrMany<T>>::deserialize(deserializer).map(|value| value.map(Into::into))
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from parsed JSON.
    ///
    /// `overrides` is checked on the raw value first so a malformed property
    /// gets its own error instead of a generic type mismatch.
    pub fn from_value(value: Value) -> Result<Self, LinterError> {
        validate_overrides(&value)?;
        serde_json::from_value(value)
            .map_err(|e| LinterError::config(format!("Invalid configuration: {e}")))
    }

    /// Parses JSON with comments and trailing commas. Empty input is an
    /// empty configuration.
    pub fn from_jsonc(content: &str) -> Result<Self, LinterError> {
        let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
            .map_err(|e| LinterError::config(format!("Failed to parse config: {e}")))?
            .unwrap_or_else(|| Value::Object(Map::new()));
        Self::from_value(value)
    }

    pub fn with_rule(mut self, name: impl Into<String>, settings: Value) -> Self {
        self.rules
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), settings);
        self
    }

    pub fn with_extends(mut self, entry: impl Into<ExtendsEntry>) -> Self {
        self.extends.push(entry.into());
        self
    }

    pub fn with_plugin(mut self, entry: impl Into<PluginEntry>) -> Self {
        self.plugins.push(entry.into());
        self
    }

    pub fn with_override(mut self, entry: Override) -> Self {
        self.overrides.push(entry);
        self
    }

    /// True if at least one rule is configured.
    pub fn has_rules(&self) -> bool {
        self.rules.as_ref().is_some_and(|rules| !rules.is_empty())
    }

    /// Fingerprint used to invalidate cached results.
    pub fn hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = blake3::Hasher::new();
        hasher.update(json.as_bytes());
        hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

fn validate_overrides(value: &Value) -> Result<(), LinterError> {
    let Some(object) = value.as_object() else {
        return Ok(());
    };

    if let Some(overrides) = object.get("overrides") {
        let entries = overrides
            .as_array()
            .ok_or_else(|| LinterError::InvalidOverrides(OVERRIDES_NOT_ARRAY.to_string()))?;
        for entry in entries {
            if entry.get("files").is_none_or(Value::is_null) {
                return Err(LinterError::InvalidOverrides(
                    OVERRIDE_WITHOUT_FILES.to_string(),
                ));
            }
            validate_overrides(entry)?;
        }
    }

    match object.get("extends") {
        Some(Value::Array(entries)) => entries.iter().try_for_each(validate_overrides),
        Some(entry) => validate_overrides(entry),
        None => Ok(()),
    }
}

/// JavaScript-style truthiness for option values.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
