//! Normalization of raw rule settings.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use sheetlint_plugin::{RuleMeta, Severity};
use tracing::warn;

use crate::Config;

/// A rule's settings after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSettings {
    pub primary: Value,
    pub secondary: Map<String, Value>,
    pub severity: Severity,
}

/// Splits raw settings into primary and secondary options.
///
/// Returns `None` when the rule is turned off (`null` or `[null]`). A bare
/// value is the primary option. For rules whose primary option is itself an
/// array, an array that does not start with an array is the whole primary
/// option.
pub fn normalize_rule_settings(
    raw: &Value,
    meta: Option<&RuleMeta>,
) -> Option<(Value, Map<String, Value>)> {
    let items: Vec<Value> = match raw {
        Value::Null => return None,
        Value::Array(items) => {
            if items.first().is_some_and(Value::is_null) {
                return None;
            }
            let primary_option_array = meta.is_some_and(|m| m.primary_option_array);
            if primary_option_array && !items.first().is_some_and(Value::is_array) {
                vec![raw.clone()]
            } else {
                items.clone()
            }
        }
        other => vec![other.clone()],
    };

    let mut items = items.into_iter();
    let primary = items.next().unwrap_or(Value::Null);
    let secondary = match items.next() {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    Some((primary, secondary))
}

/// Severity from the `severity` secondary option, else `default`, else
/// [`Severity::Error`].
pub fn resolve_severity(
    rule_name: &str,
    secondary: &Map<String, Value>,
    default: Option<Severity>,
) -> Severity {
    let fallback = default.unwrap_or_default();
    match secondary.get("severity").and_then(Value::as_str) {
        Some(name) => name.parse().unwrap_or_else(|_| {
            warn!("Ignoring unknown severity \"{}\" for rule \"{}\"", name, rule_name);
            fallback
        }),
        None => fallback,
    }
}

/// Normalizes every enabled rule in `config`. Disabled rules are dropped.
pub fn normalize_rules<F>(config: &Config, meta_of: F) -> IndexMap<String, RuleSettings>
where
    F: Fn(&str) -> Option<RuleMeta>,
{
    let Some(rules) = &config.rules else {
        return IndexMap::new();
    };

    rules
        .iter()
        .filter_map(|(name, raw)| {
            let meta = meta_of(name);
            let (primary, secondary) = normalize_rule_settings(raw, meta.as_ref())?;
            let severity = resolve_severity(name, &secondary, config.default_severity);
            Some((
                name.clone(),
                RuleSettings {
                    primary,
                    secondary,
                    severity,
                },
            ))
        })
        .collect()
}
