//! Plugin bundles and the catalog they are registered in.
//!
//! Configurations name plugins by specifier (`"sheetlint-plugin-foo"` or a
//! path). The host registers every plugin it wants to make available up
//! front; lookups never load code.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::Rule;

/// Namespaced rule name to rule, built once per resolved configuration.
pub type PluginFunctions = HashMap<String, Arc<dyn Rule>>;

/// One rule exported by a plugin.
#[derive(Clone)]
pub struct PluginRule {
    /// Must be `namespace/name`; checked when the plugin is loaded.
    pub rule_name: String,
    pub rule: Arc<dyn Rule>,
}

impl fmt::Debug for PluginRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRule")
            .field("rule_name", &self.rule_name)
            .finish_non_exhaustive()
    }
}

/// A bundle of rules.
#[derive(Debug, Clone, Default)]
pub struct Plugin {
    pub name: String,
    pub rules: Vec<PluginRule>,
    /// Uses a deprecated module format; loading it logs a warning.
    pub legacy: bool,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            legacy: false,
        }
    }

    pub fn with_rule(mut self, rule_name: impl Into<String>, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(PluginRule {
            rule_name: rule_name.into(),
            rule,
        });
        self
    }

    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }
}

/// Plugins available to configurations, keyed by specifier.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    plugins: HashMap<String, Arc<Plugin>>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin` under `specifier`, replacing any previous entry.
    pub fn register(&mut self, specifier: impl Into<String>, plugin: Plugin) {
        let specifier = specifier.into();
        debug!(
            "Registering plugin '{}' as '{}' ({} rules)",
            plugin.name,
            specifier,
            plugin.rules.len()
        );
        self.plugins.insert(specifier, Arc::new(plugin));
    }

    pub fn get(&self, specifier: &str) -> Option<Arc<Plugin>> {
        self.plugins.get(specifier).cloned()
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.plugins.contains_key(specifier)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
