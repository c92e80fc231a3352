//! Plugin error types.

use thiserror::Error;

/// Errors raised while turning plugins into rules.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin rule has no name.
    #[error(
        "sheetlint requires plugins to expose a ruleName. The plugin \"{plugin}\" is not doing this, so will not work with sheetlint. Please file an issue with the plugin."
    )]
    MissingRuleName { plugin: String },

    /// A plugin rule name has no `namespace/` prefix.
    #[error(
        "sheetlint requires plugin rules to be namespaced, i.e. only `plugin-namespace/plugin-rule-name` plugin rule names are supported. The plugin rule \"{rule_name}\" does not do this, so will not work. Please file an issue with the plugin."
    )]
    MissingNamespace { rule_name: String },

    /// No plugin is registered under the specifier.
    #[error("Could not find plugin \"{0}\"")]
    NotFound(String),

    /// A severity string that is neither `error` nor `warning`.
    #[error("Unknown severity \"{0}\"")]
    InvalidSeverity(String),
}

impl PluginError {
    /// Creates a missing rule name error.
    pub fn missing_rule_name(plugin: impl Into<String>) -> Self {
        Self::MissingRuleName {
            plugin: plugin.into(),
        }
    }

    /// Creates a missing namespace error.
    pub fn missing_namespace(rule_name: impl Into<String>) -> Self {
        Self::MissingNamespace {
            rule_name: rule_name.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(specifier: impl Into<String>) -> Self {
        Self::NotFound(specifier.into())
    }
}
