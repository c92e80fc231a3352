//! Everything a configuration can refer to by name.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use sheetlint_parser::{CssParser, Parser};
use sheetlint_plugin::{Plugin, PluginCatalog, Rule};
use tracing::debug;

use crate::{Config, LinterError};

/// Name of the parser used when nothing else is selected.
pub const DEFAULT_SYNTAX: &str = "css";

/// Rules, plugins, shareable configurations and parsers known to a run.
///
/// The host fills the registry before linting. Lookups never load code.
#[derive(Clone)]
pub struct Registry {
    rules: HashMap<String, Arc<dyn Rule>>,
    plugins: PluginCatalog,
    configs: HashMap<String, Config>,
    parsers: HashMap<String, Arc<dyn Parser>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<_> = self.rules.keys().collect();
        rules.sort();
        let mut parsers: Vec<_> = self.parsers.keys().collect();
        parsers.sort();
        f.debug_struct("Registry")
            .field("rules", &rules)
            .field("plugins", &self.plugins.len())
            .field("configs", &self.configs.len())
            .field("parsers", &parsers)
            .finish()
    }
}

impl Registry {
    /// Creates a registry with the built-in CSS parser.
    pub fn new() -> Self {
        let mut registry = Self {
            rules: HashMap::new(),
            plugins: PluginCatalog::new(),
            configs: HashMap::new(),
            parsers: HashMap::new(),
        };
        registry.register_parser(DEFAULT_SYNTAX, Arc::new(CssParser::new()));
        registry
    }

    pub fn register_rule(&mut self, name: impl Into<String>, rule: Arc<dyn Rule>) {
        let name = name.into();
        debug!("Registering rule '{}'", name);
        self.rules.insert(name, rule);
    }

    pub fn with_rule(mut self, name: impl Into<String>, rule: Arc<dyn Rule>) -> Self {
        self.register_rule(name, rule);
        self
    }

    pub fn register_plugin(&mut self, specifier: impl Into<String>, plugin: Plugin) {
        self.plugins.register(specifier, plugin);
    }

    pub fn with_plugin(mut self, specifier: impl Into<String>, plugin: Plugin) -> Self {
        self.register_plugin(specifier, plugin);
        self
    }

    /// Registers a shareable configuration for `extends` lookups by name.
    pub fn register_config(&mut self, name: impl Into<String>, config: Config) {
        self.configs.insert(name.into(), config);
    }

    pub fn with_config(mut self, name: impl Into<String>, config: Config) -> Self {
        self.register_config(name, config);
        self
    }

    pub fn register_parser(&mut self, name: impl Into<String>, parser: Arc<dyn Parser>) {
        self.parsers.insert(name.into(), parser);
    }

    pub fn with_parser(mut self, name: impl Into<String>, parser: Arc<dyn Parser>) -> Self {
        self.register_parser(name, parser);
        self
    }

    pub fn rule(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.rules.get(name).cloned()
    }

    pub fn plugins(&self) -> &PluginCatalog {
        &self.plugins
    }

    pub fn shareable_config(&self, name: &str) -> Option<&Config> {
        self.configs.get(name)
    }

    /// Picks the parser for an input.
    ///
    /// `custom_syntax` must name a registered parser. Without it, the first
    /// parser claiming the file extension is used, else the CSS parser.
    pub fn parser_for(
        &self,
        custom_syntax: Option<&str>,
        path: Option<&Path>,
    ) -> Result<Arc<dyn Parser>, LinterError> {
        if let Some(name) = custom_syntax {
            return self.parsers.get(name).cloned().ok_or_else(|| {
                LinterError::config(format!(
                    "Cannot resolve custom syntax module \"{name}\". Check that module \"{name}\" is available and spelled correctly."
                ))
            });
        }

        let by_extension = path
            .and_then(|p| p.extension())
            .and_then(|ext| ext.to_str())
            .and_then(|ext| {
                let mut names: Vec<&String> = self.parsers.keys().collect();
                names.sort();
                names
                    .into_iter()
                    .filter_map(|name| self.parsers.get(name))
                    .find(|parser| parser.can_parse(ext))
                    .cloned()
            });

        match by_extension {
            Some(parser) => Ok(parser),
            None => self
                .parsers
                .get(DEFAULT_SYNTAX)
                .cloned()
                .ok_or_else(|| LinterError::Internal("No default parser registered".to_string())),
        }
    }
}
