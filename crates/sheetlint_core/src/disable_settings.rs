//! Validation of the disable-comment report options.

use regex::Regex;
use serde_json::{Map, Value};
use sheetlint_plugin::Severity;

use crate::{Config, LintResult};

/// Secondary keys every rule-like option accepts and these reports ignore.
const IGNORED_KEYS: &[&str] = &["message", "url", "reportDisables", "disableFix"];

/// The three disable-comment reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisableReport {
    Needless,
    InvalidScope,
    Descriptionless,
}

impl DisableReport {
    /// Rule name carried by the report's warnings.
    pub const fn rule_name(self) -> &'static str {
        match self {
            Self::Needless => "--report-needless-disables",
            Self::InvalidScope => "--report-invalid-scope-disables",
            Self::Descriptionless => "--report-descriptionless-disables",
        }
    }

    fn raw(self, config: &Config) -> Option<&Value> {
        match self {
            Self::Needless => config.report_needless_disables.as_ref(),
            Self::InvalidScope => config.report_invalid_scope_disables.as_ref(),
            Self::Descriptionless => config.report_descriptionless_disables.as_ref(),
        }
    }
}

/// A rule name or `/regex/` in `except`.
#[derive(Debug, Clone)]
pub enum ExceptPattern {
    Name(String),
    Regex(Regex),
}

impl ExceptPattern {
    fn parse(raw: &str) -> Option<Self> {
        match raw
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(pattern) if !pattern.is_empty() => Regex::new(pattern).ok().map(Self::Regex),
            _ => Some(Self::Name(raw.to_string())),
        }
    }

    pub fn matches(&self, rule: &str) -> bool {
        match self {
            Self::Name(name) => name == rule,
            Self::Regex(regex) => regex.is_match(rule),
        }
    }
}

/// Validated settings for one report.
#[derive(Debug, Clone)]
pub struct DisableSettings {
    pub enabled: bool,
    pub except: Vec<ExceptPattern>,
    pub severity: Severity,
}

impl DisableSettings {
    /// Whether disables of `rule` are reported. `except` inverts `enabled`.
    pub fn applies_to(&self, rule: &str) -> bool {
        self.enabled != self.except.iter().any(|pattern| pattern.matches(rule))
    }
}

/// Reads and validates the option for `report` from `config`.
///
/// Returns `None` when there is no result or config, when the option is
/// unset or disabled without exceptions, or when it is invalid. Invalid
/// options are recorded on `result`.
pub fn validate_disable_settings(
    result: Option<&mut LintResult>,
    config: Option<&Config>,
    report: DisableReport,
) -> Option<DisableSettings> {
    let result = result?;
    let config = config?;
    let raw = report.raw(config)?;
    let field = report.rule_name();

    let (enabled, options) = match raw {
        Value::Null => (false, None),
        Value::Bool(enabled) => (*enabled, None),
        Value::Array(items) => match items.as_slice() {
            [Value::Bool(enabled)] => (*enabled, None),
            [Value::Bool(enabled), Value::Object(options)] => (*enabled, Some(options)),
            [first, ..] if !first.is_boolean() => {
                result.invalid_option(invalid_value(first, field));
                return None;
            }
            _ => {
                result.invalid_option(invalid_value(raw, field));
                return None;
            }
        },
        other => {
            result.invalid_option(invalid_value(other, field));
            return None;
        }
    };

    let (except, severity) = match options {
        Some(options) => parse_options(result, options, field)?,
        None => (Vec::new(), None),
    };

    if !enabled && except.is_empty() {
        return None;
    }

    Some(DisableSettings {
        enabled,
        except,
        severity: severity
            .or(config.default_severity)
            .unwrap_or_default(),
    })
}

fn parse_options(
    result: &mut LintResult,
    options: &Map<String, Value>,
    field: &str,
) -> Option<(Vec<ExceptPattern>, Option<Severity>)> {
    let mut valid = true;
    let mut except = Vec::new();
    let mut severity = None;

    for (key, value) in options {
        match key.as_str() {
            "except" => {
                let items: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    single => vec![single],
                };
                for item in items {
                    match item.as_str().and_then(ExceptPattern::parse) {
                        Some(pattern) => except.push(pattern),
                        None => {
                            result.invalid_option(format!(
                                "Invalid value \"{}\" for option \"except\" of rule \"{field}\"",
                                display(item)
                            ));
                            valid = false;
                        }
                    }
                }
            }
            "severity" => match value.as_str().map(str::parse::<Severity>) {
                Some(Ok(parsed)) => severity = Some(parsed),
                _ => {
                    result.invalid_option(format!(
                        "Invalid value \"{}\" for option \"severity\" of rule \"{field}\"",
                        display(value)
                    ));
                    valid = false;
                }
            },
            other if IGNORED_KEYS.contains(&other) => {}
            other => {
                result.invalid_option(format!(
                    "Invalid option name \"{other}\" for rule \"{field}\""
                ));
                valid = false;
            }
        }
    }

    valid.then_some((except, severity))
}

fn invalid_value(value: &Value, field: &str) -> String {
    format!(
        "Invalid option value \"{}\" for rule \"{field}\"",
        display(value)
    )
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
