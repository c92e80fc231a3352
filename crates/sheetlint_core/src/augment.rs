//! Turns a loaded configuration into the effective one for an input.
//!
//! Basic augmentation folds run options, matching overrides and `extends`
//! into one [`Config`] and makes its paths absolute. Full augmentation then
//! loads plugins, requires rules and normalizes every rule's settings.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use sheetlint_plugin::PluginFunctions;
use tracing::debug;

use crate::config::is_truthy;
use crate::loader::{ConfigLoader, LoadedConfig};
use crate::merge::merge_configs;
use crate::normalize::{RuleSettings, normalize_rules};
use crate::overrides::apply_overrides;
use crate::paths::{absolutize, absolutize_glob, is_path_like, to_posix};
use crate::plugin_loader::load_plugins;
use crate::{Config, ExtendsEntry, LintOptions, LinterError, PluginEntry, Registry};

/// Maximum nesting of `extends`.
pub const MAX_EXTENDS_DEPTH: usize = 10;

const NO_RULES: &str =
    "No rules found within configuration. Have you provided a \"rules\" property?";

/// The fully resolved configuration for one input.
#[derive(Clone)]
pub struct ResolvedConfig {
    /// Merged configuration, without `extends` or `overrides`.
    pub config: Config,
    /// File the root configuration was loaded from.
    pub file: Option<PathBuf>,
    pub plugin_functions: PluginFunctions,
    /// Enabled rules in configuration order.
    pub rules: IndexMap<String, RuleSettings>,
    /// Fingerprint of `config`.
    pub hash: String,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut plugin_rules: Vec<_> = self.plugin_functions.keys().collect();
        plugin_rules.sort();
        f.debug_struct("ResolvedConfig")
            .field("config", &self.config)
            .field("file", &self.file)
            .field("plugin_functions", &plugin_rules)
            .field("rules", &self.rules)
            .field("hash", &self.hash)
            .finish()
    }
}

impl ResolvedConfig {
    pub fn fix(&self) -> bool {
        self.config.fix.unwrap_or(false)
    }

    pub fn quiet(&self) -> bool {
        self.config.quiet.unwrap_or(false)
    }

    pub fn ignore_disables(&self) -> bool {
        self.config.ignore_disables.unwrap_or(false)
    }
}

/// Resolves configurations against a registry and a loader.
pub struct ConfigAugmenter<'a> {
    registry: &'a Registry,
    loader: &'a dyn ConfigLoader,
    options: &'a LintOptions,
    cwd: &'a Path,
}

impl<'a> ConfigAugmenter<'a> {
    pub fn new(
        registry: &'a Registry,
        loader: &'a dyn ConfigLoader,
        options: &'a LintOptions,
        cwd: &'a Path,
    ) -> Self {
        Self {
            registry,
            loader,
            options,
            cwd,
        }
    }

    /// Basic augmentation of `loaded` with run options applied. Relative
    /// paths resolve against `configBasedir`, else the config's directory.
    pub fn augment_loaded(
        &self,
        loaded: &LoadedConfig,
        input_path: Option<&Path>,
    ) -> Result<Config, LinterError> {
        let config_dir = match &self.options.config_basedir {
            Some(dir) => absolutize(dir, self.cwd),
            None => loaded.dir().unwrap_or(self.cwd).to_path_buf(),
        };

        let mut chain = IndexSet::new();
        if let Some(file) = &loaded.file {
            chain.insert(to_posix(file));
        }

        self.augment_basic(
            &loaded.config,
            &config_dir,
            true,
            &config_dir,
            input_path,
            &mut chain,
        )
    }

    /// Full augmentation of `loaded` for `input_path`.
    pub fn augment_full(
        &self,
        loaded: &LoadedConfig,
        input_path: Option<&Path>,
    ) -> Result<ResolvedConfig, LinterError> {
        let config = self.augment_loaded(loaded, input_path)?;

        let plugin_functions = load_plugins(
            &config.plugins,
            self.registry.plugins(),
            self.options.quiet_deprecation_warnings,
        )?;

        if !config.has_rules() {
            return Err(LinterError::config(NO_RULES));
        }

        let rules = normalize_rules(&config, |name| {
            plugin_functions
                .get(name)
                .cloned()
                .or_else(|| self.registry.rule(name))
                .map(|rule| rule.meta())
        });
        let hash = config.hash();

        debug!(
            "Resolved config for {} ({} rules enabled)",
            input_path.map_or_else(|| "<input>".to_string(), |p| p.display().to_string()),
            rules.len()
        );

        Ok(ResolvedConfig {
            config,
            file: loaded.file.clone(),
            plugin_functions,
            rules,
            hash,
        })
    }

    /// Basic augmentation: run options (when `allow_overrides`), overrides
    /// (when the input is known), `extends`, then path absolutization.
    pub fn augment_basic(
        &self,
        config: &Config,
        config_dir: &Path,
        allow_overrides: bool,
        root_config_dir: &Path,
        input_path: Option<&Path>,
        chain: &mut IndexSet<String>,
    ) -> Result<Config, LinterError> {
        let mut augmented = if allow_overrides {
            self.add_options(config)
        } else {
            config.clone()
        };

        if let Some(path) = input_path {
            augmented = apply_overrides(&augmented, root_config_dir, path)?;
        }

        augmented =
            self.extend_config(&augmented, config_dir, root_config_dir, input_path, chain)?;

        Ok(absolutize_paths(augmented, config_dir))
    }

    /// Resolves `config.extends`. The including configuration always wins
    /// over what it extends, and later entries win over earlier ones.
    pub fn extend_config(
        &self,
        config: &Config,
        config_dir: &Path,
        root_config_dir: &Path,
        input_path: Option<&Path>,
        chain: &mut IndexSet<String>,
    ) -> Result<Config, LinterError> {
        if config.extends.is_empty() {
            return Ok(config.clone());
        }

        let original = Config {
            extends: Vec::new(),
            ..config.clone()
        };
        let mut result = original.clone();

        for entry in &config.extends {
            let extended = match entry {
                ExtendsEntry::Inline(inline) => self.augment_basic(
                    inline,
                    config_dir,
                    false,
                    root_config_dir,
                    input_path,
                    chain,
                )?,
                ExtendsEntry::Lookup(lookup) => {
                    let (loaded, key) = self.load_extended(lookup, config_dir)?;
                    if chain.contains(&key) {
                        let mut cycle: Vec<&str> = chain.iter().map(String::as_str).collect();
                        cycle.push(&key);
                        return Err(LinterError::config(format!(
                            "Circular extends detected: {}",
                            cycle.join(" -> ")
                        )));
                    }
                    if chain.len() > MAX_EXTENDS_DEPTH {
                        return Err(LinterError::config(format!(
                            "Extends chain exceeds maximum depth of {MAX_EXTENDS_DEPTH} at \"{lookup}\""
                        )));
                    }

                    debug!("Extending {}", key);
                    chain.insert(key);
                    let extended_dir = loaded.dir().unwrap_or(config_dir).to_path_buf();
                    let extended = self.augment_basic(
                        &loaded.config,
                        &extended_dir,
                        false,
                        root_config_dir,
                        input_path,
                        chain,
                    );
                    chain.pop();
                    extended?
                }
            };
            result = merge_configs(&result, &extended);
        }

        Ok(merge_configs(&result, &original))
    }

    /// Finds an extended configuration. Registered shareable configs are
    /// tried first, then files relative to `config_dir`, then to `cwd`.
    fn load_extended(
        &self,
        lookup: &str,
        config_dir: &Path,
    ) -> Result<(LoadedConfig, String), LinterError> {
        if let Some(config) = self.registry.shareable_config(lookup) {
            return Ok((LoadedConfig::inline(config.clone()), format!("config:{lookup}")));
        }

        let candidates = [
            config_dir.join(lookup),
            config_dir.join(format!("{lookup}.json")),
            self.cwd.join(lookup),
            self.cwd.join(format!("{lookup}.json")),
        ];
        for candidate in candidates {
            if candidate.is_file() {
                let path = absolutize(&candidate, self.cwd);
                let loaded = self.loader.load_extended(&path)?;
                return Ok((loaded, to_posix(&path)));
            }
        }

        Err(LinterError::config(format!(
            "Could not find \"{lookup}\". Do you need the `configBasedir`?"
        )))
    }

    /// Folds truthy run options into `config`.
    pub fn add_options(&self, config: &Config) -> Config {
        let options = self.options;
        let mut config = config.clone();

        if options.ignore_disables {
            config.ignore_disables = Some(true);
        }
        if options.quiet {
            config.quiet = Some(true);
        }
        if let Some(value) = &options.report_needless_disables
            && is_truthy(value)
        {
            config.report_needless_disables = Some(value.clone());
        }
        if let Some(value) = &options.report_invalid_scope_disables
            && is_truthy(value)
        {
            config.report_invalid_scope_disables = Some(value.clone());
        }
        if let Some(value) = &options.report_descriptionless_disables
            && is_truthy(value)
        {
            config.report_descriptionless_disables = Some(value.clone());
        }
        if let Some(syntax) = &options.custom_syntax
            && !syntax.is_empty()
        {
            config.custom_syntax = Some(syntax.clone());
        }
        if options.fix == Some(true) {
            config.fix = Some(true);
        }

        config
    }
}

/// Makes `ignoreFiles` globs and path-like plugin specifiers absolute.
pub fn absolutize_paths(mut config: Config, config_dir: &Path) -> Config {
    if let Some(globs) = config.ignore_files.as_mut() {
        for glob in globs.iter_mut() {
            *glob = absolutize_glob(glob, config_dir);
        }
    }

    for plugin in &mut config.plugins {
        if let PluginEntry::Lookup(specifier) = plugin
            && is_path_like(specifier)
        {
            *specifier = to_posix(&absolutize(Path::new(specifier.as_str()), config_dir));
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Override;
    use crate::loader::FileConfigLoader;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sheetlint_plugin::{Plugin, RuleMeta, Severity, rule_fn};
    use std::fs;
    use tempfile::TempDir;

    fn augment(
        registry: &Registry,
        options: &LintOptions,
        loaded: &LoadedConfig,
        input: Option<&Path>,
    ) -> Result<ResolvedConfig, LinterError> {
        let loader = FileConfigLoader::new();
        let cwd = Path::new("/project");
        ConfigAugmenter::new(registry, &loader, options, cwd).augment_full(loaded, input)
    }

    #[test]
    fn extended_config_loses_to_including_config() {
        let registry = Registry::new().with_config(
            "base",
            Config::new()
                .with_rule("a", json!(1))
                .with_rule("b", json!(1)),
        );
        let config = Config::new().with_extends("base").with_rule("a", json!(2));
        let resolved = augment(
            &registry,
            &LintOptions::default(),
            &LoadedConfig::inline(config),
            None,
        )
        .unwrap();

        assert!(resolved.config.extends.is_empty());
        assert_eq!(resolved.rules["a"].primary, json!(2));
        assert_eq!(resolved.rules["b"].primary, json!(1));
    }

    #[test]
    fn later_extends_win_over_earlier() {
        let registry = Registry::new()
            .with_config("one", Config::new().with_rule("r", json!("one")))
            .with_config("two", Config::new().with_rule("r", json!("two")));
        let config = Config::new().with_extends("one").with_extends("two");
        let resolved = augment(
            &registry,
            &LintOptions::default(),
            &LoadedConfig::inline(config),
            None,
        )
        .unwrap();
        assert_eq!(resolved.rules["r"].primary, json!("two"));
    }

    #[test]
    fn override_wins_over_base_for_matching_input() {
        let config = Config::new()
            .with_rule("r", json!(true))
            .with_override(Override::new(
                ["*.module.css"],
                Config::new().with_rule("r", json!([true, { "severity": "warning" }])),
            ));
        let loaded = LoadedConfig::new(config, "/project/.sheetlintrc");
        let options = LintOptions::default();
        let registry = Registry::new();

        let matched =
            augment(&registry, &options, &loaded, Some(Path::new("/project/a.module.css")))
                .unwrap();
        assert_eq!(matched.rules["r"].severity, Severity::Warning);
        assert!(matched.config.overrides.is_empty());

        let unmatched =
            augment(&registry, &options, &loaded, Some(Path::new("/project/a.css"))).unwrap();
        assert_eq!(unmatched.rules["r"].severity, Severity::Error);
    }

    #[test]
    fn overrides_inside_extended_configs_resolve_against_root_dir() {
        let registry = Registry::new().with_config(
            "shared",
            Config::new().with_override(Override::new(
                ["src/*.css"],
                Config::new().with_rule("from-override", json!(true)),
            )),
        );
        let loaded = LoadedConfig::new(
            Config::new().with_extends("shared").with_rule("r", json!(true)),
            "/project/.sheetlintrc",
        );
        let resolved = augment(
            &registry,
            &LintOptions::default(),
            &loaded,
            Some(Path::new("/project/src/a.css")),
        )
        .unwrap();
        assert!(resolved.rules.contains_key("from-override"));
    }

    #[test]
    fn missing_rules_is_fatal() {
        let err = augment(
            &Registry::new(),
            &LintOptions::default(),
            &LoadedConfig::inline(Config::new()),
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), NO_RULES);

        let empty = Config {
            rules: Some(IndexMap::new()),
            ..Config::default()
        };
        assert!(
            augment(
                &Registry::new(),
                &LintOptions::default(),
                &LoadedConfig::inline(empty),
                None
            )
            .is_err()
        );
    }

    #[test]
    fn run_options_are_added_when_truthy() {
        let options = LintOptions {
            quiet: true,
            fix: Some(true),
            report_needless_disables: Some(json!(false)),
            report_invalid_scope_disables: Some(json!([true, { "severity": "warning" }])),
            custom_syntax: Some("css".to_string()),
            ..LintOptions::default()
        };
        let resolved = augment(
            &Registry::new(),
            &options,
            &LoadedConfig::inline(Config::new().with_rule("r", json!(true))),
            None,
        )
        .unwrap();

        assert!(resolved.quiet());
        assert!(resolved.fix());
        assert_eq!(resolved.config.report_needless_disables, None);
        assert!(resolved.config.report_invalid_scope_disables.is_some());
        assert_eq!(resolved.config.custom_syntax.as_deref(), Some("css"));
    }

    #[test]
    fn plugins_are_loaded_and_provide_meta() {
        let plugin = Plugin::new("p").with_rule(
            "p/list",
            rule_fn(RuleMeta::default().primary_option_array(), |_, _| {}),
        );
        let registry = Registry::new().with_plugin("sheetlint-plugin-p", plugin);
        let config = Config::new()
            .with_plugin("sheetlint-plugin-p")
            .with_rule("p/list", json!(["a", "b"]));

        let resolved = augment(
            &registry,
            &LintOptions::default(),
            &LoadedConfig::inline(config),
            None,
        )
        .unwrap();
        assert!(resolved.plugin_functions.contains_key("p/list"));
        assert_eq!(resolved.rules["p/list"].primary, json!(["a", "b"]));
    }

    #[test]
    fn paths_are_absolutized_against_config_dir() {
        let config = Config {
            ignore_files: Some(vec!["vendor/**".to_string(), "!keep.css".to_string()]),
            ..Config::new()
                .with_plugin("./plugins/local")
                .with_plugin("bare-plugin")
        };
        let config = absolutize_paths(config, Path::new("/project/cfg"));
        assert_eq!(
            config.ignore_files.unwrap(),
            vec!["/project/cfg/vendor/**", "!/project/cfg/keep.css"]
        );
        assert_eq!(
            config.plugins,
            vec![
                PluginEntry::from("/project/cfg/plugins/local"),
                PluginEntry::from("bare-plugin")
            ]
        );
    }

    #[test]
    fn file_extends_resolve_relative_to_including_config() {
        let temp = TempDir::new().unwrap();
        let shared = temp.path().join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(
            shared.join("base.json"),
            r#"{ "extends": "./inner", "ignoreFiles": "dist/**", "rules": { "a": true } }"#,
        )
        .unwrap();
        fs::write(shared.join("inner.json"), r#"{ "rules": { "b": true } }"#).unwrap();

        let loaded = LoadedConfig::new(
            Config::new().with_extends("./shared/base"),
            temp.path().join(".sheetlintrc"),
        );
        let registry = Registry::new();
        let options = LintOptions::default();
        let loader = FileConfigLoader::new();
        let resolved = ConfigAugmenter::new(&registry, &loader, &options, temp.path())
            .augment_full(&loaded, None)
            .unwrap();

        assert!(resolved.rules.contains_key("a"));
        assert!(resolved.rules.contains_key("b"));
        assert_eq!(
            resolved.config.ignore_files.unwrap(),
            vec![format!("{}/dist/**", to_posix(&shared))]
        );
    }

    #[test]
    fn circular_extends_are_detected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.json"), r#"{ "extends": "./b", "rules": { "a": 1 } }"#)
            .unwrap();
        fs::write(temp.path().join("b.json"), r#"{ "extends": "./a" }"#).unwrap();

        let loaded = FileConfigLoader::read(&temp.path().join("a.json")).unwrap();
        let registry = Registry::new();
        let options = LintOptions::default();
        let loader = FileConfigLoader::new();
        let err = ConfigAugmenter::new(&registry, &loader, &options, temp.path())
            .augment_full(&loaded, None)
            .unwrap_err();
        assert!(err.to_string().starts_with("Circular extends detected"));
    }

    #[test]
    fn unresolvable_extends_is_reported() {
        let err = augment(
            &Registry::new(),
            &LintOptions::default(),
            &LoadedConfig::inline(Config::new().with_extends("nope").with_rule("a", json!(1))),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find \"nope\". Do you need the `configBasedir`?"
        );
    }
}
