//! Resolves configured plugins into rule functions.

use std::sync::Arc;

use sheetlint_plugin::{Plugin, PluginCatalog, PluginError, PluginFunctions};
use tracing::{debug, warn};

use crate::{LinterError, PluginEntry};

/// Builds the namespaced rule table for `plugins`.
///
/// Specifiers are looked up in `catalog`. Every exported rule name must be
/// non-empty and contain `/`. A later plugin replaces an earlier one's rule
/// of the same name.
pub fn load_plugins(
    plugins: &[PluginEntry],
    catalog: &PluginCatalog,
    quiet_deprecation_warnings: bool,
) -> Result<PluginFunctions, LinterError> {
    let mut functions = PluginFunctions::new();

    for entry in plugins {
        let plugin: Arc<Plugin> = match entry {
            PluginEntry::Resolved(plugin) => Arc::clone(plugin),
            PluginEntry::Lookup(specifier) => catalog
                .get(specifier)
                .ok_or_else(|| PluginError::not_found(specifier))?,
        };

        if plugin.legacy && !quiet_deprecation_warnings {
            warn!(
                "Plugin \"{}\" uses a deprecated module format and may stop working in a future release",
                plugin.name
            );
        }

        for export in &plugin.rules {
            if export.rule_name.is_empty() {
                return Err(PluginError::missing_rule_name(&plugin.name).into());
            }
            if !export.rule_name.contains('/') {
                return Err(PluginError::missing_namespace(&export.rule_name).into());
            }
            debug!("Plugin \"{}\" provides {}", plugin.name, export.rule_name);
            functions.insert(export.rule_name.clone(), Arc::clone(&export.rule));
        }
    }

    Ok(functions)
}
