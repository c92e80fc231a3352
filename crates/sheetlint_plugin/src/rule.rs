//! The rule interface.
//!
//! A rule receives the parsed tree and a [`RuleContext`] carrying its resolved
//! options. It reports problems through the context and, when `fix` is set,
//! may edit the tree in place instead of reporting.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sheetlint_ast::{Root, SourceRange};

use crate::{Severity, Warning};

/// Static facts about a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMeta {
    /// Documentation link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub fixable: bool,
    #[serde(default)]
    pub deprecated: bool,
    /// The primary option is itself an array, so `[a, b]` is not
    /// `[primary, secondary]`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary_option_array: bool,
}

impl RuleMeta {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn primary_option_array(mut self) -> Self {
        self.primary_option_array = true;
        self
    }
}

/// A single check.
///
/// Rules are shared across concurrently linted inputs, so they must not keep
/// per-input state outside the context.
pub trait Rule: Send + Sync {
    fn meta(&self) -> RuleMeta {
        RuleMeta::default()
    }

    fn check(&self, root: &mut Root, ctx: &mut RuleContext);
}

/// Per-input, per-rule state handed to [`Rule::check`].
#[derive(Debug, Clone)]
pub struct RuleContext {
    rule_name: String,
    primary: Value,
    secondary: Map<String, Value>,
    severity: Severity,
    fix: bool,
    message: Option<String>,
    file: Option<PathBuf>,
    warnings: Vec<Warning>,
    invalid_options: Vec<String>,
}

/// What a rule run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutput {
    pub warnings: Vec<Warning>,
    pub invalid_options: Vec<String>,
}

impl RuleContext {
    pub fn new(
        rule_name: impl Into<String>,
        primary: Value,
        secondary: Map<String, Value>,
        severity: Severity,
    ) -> Self {
        let message = secondary
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            rule_name: rule_name.into(),
            primary,
            secondary,
            severity,
            fix: false,
            message,
            file: None,
            warnings: Vec::new(),
            invalid_options: Vec::new(),
        }
    }

    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    pub fn primary(&self) -> &Value {
        &self.primary
    }

    pub fn secondary(&self) -> &Map<String, Value> {
        &self.secondary
    }

    pub fn secondary_option(&self, key: &str) -> Option<&Value> {
        self.secondary.get(key)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether the rule should fix instead of report.
    pub fn fix(&self) -> bool {
        self.fix
    }

    /// Custom message from the `message` secondary option.
    pub fn custom_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Reports a problem at `source`, or at the start of the input when the
    /// node has no source range.
    ///
    /// `text` gets a ` (rule-name)` suffix unless a custom message is set,
    /// which replaces it verbatim.
    pub fn report(&mut self, text: impl Into<String>, source: Option<&SourceRange>) {
        let text = match &self.message {
            Some(message) => message.clone(),
            None => format!("{} ({})", text.into(), self.rule_name),
        };
        let warning = match source {
            Some(range) => Warning::at(&self.rule_name, text, range.loc),
            None => Warning::new(&self.rule_name, text, 1, 1),
        };
        self.warnings.push(warning.with_severity(self.severity));
    }

    /// Records an invalid option. The rule should return without checking.
    pub fn invalid_option(&mut self, text: impl Into<String>) {
        self.invalid_options.push(text.into());
    }

    pub fn has_invalid_options(&self) -> bool {
        !self.invalid_options.is_empty()
    }

    pub fn into_output(self) -> RuleOutput {
        RuleOutput {
            warnings: self.warnings,
            invalid_options: self.invalid_options,
        }
    }
}

/// A rule backed by a closure.
pub struct FnRule<F> {
    meta: RuleMeta,
    check: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&mut Root, &mut RuleContext) + Send + Sync,
{
    fn meta(&self) -> RuleMeta {
        self.meta.clone()
    }

    fn check(&self, root: &mut Root, ctx: &mut RuleContext) {
        (self.check)(root, ctx);
    }
}

/// Wraps a closure as a shareable rule.
pub fn rule_fn<F>(meta: RuleMeta, check: F) -> Arc<dyn Rule>
where
    F: Fn(&mut Root, &mut RuleContext) + Send + Sync + 'static,
{
    Arc::new(FnRule { meta, check })
}
