//! Lint result types.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sheetlint_parser::SyntaxError;
use sheetlint_plugin::{RuleMeta, Severity, Warning};

use crate::disables::DisabledRange;
use crate::formatters::Formatter;
use crate::LinterError;

/// Rule name of results produced from non-syntax input errors.
pub const INPUT_ERROR_RULE: &str = "InputError";

/// A deprecated rule that was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deprecation {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A rule or report option that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidOptionWarning {
    pub text: String,
}

/// Result of linting one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    /// Input path. `None` for code without a file name.
    pub source: Option<PathBuf>,

    pub deprecations: Vec<Deprecation>,

    pub invalid_option_warnings: Vec<InvalidOptionWarning>,

    pub parse_errors: Vec<Warning>,

    /// Any error-severity warning or invalid option.
    pub errored: bool,

    pub warnings: Vec<Warning>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignored: bool,

    /// Skipped because the input was unchanged since a clean run.
    #[serde(skip)]
    pub from_cache: bool,

    #[serde(skip)]
    pub rule_severities: BTreeMap<String, Severity>,

    #[serde(skip)]
    pub custom_messages: BTreeMap<String, String>,

    #[serde(skip)]
    pub rule_metadata: BTreeMap<String, RuleMeta>,

    #[serde(skip)]
    pub disabled_ranges: Vec<DisabledRange>,
}

impl LintResult {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// An input skipped by ignore rules.
    pub fn ignored(source: Option<PathBuf>) -> Self {
        Self {
            ignored: true,
            ..Self::new(source)
        }
    }

    /// An input skipped because its cached result is still valid.
    pub fn cached(source: Option<PathBuf>) -> Self {
        Self {
            from_cache: true,
            ..Self::ignored(source)
        }
    }

    /// A result holding only `error`, reported as a `CssSyntaxError` warning.
    pub fn from_syntax_error(source: Option<PathBuf>, error: &SyntaxError) -> Self {
        let source = source.or_else(|| error.file.clone());
        let warning = Warning::new(
            SyntaxError::NAME,
            format!("{} ({})", error.reason, SyntaxError::NAME),
            error.line,
            error.column,
        );
        Self {
            errored: true,
            warnings: vec![warning],
            ..Self::new(source)
        }
    }

    /// A result holding a non-syntax error for one input.
    pub fn from_error(source: Option<PathBuf>, error: &LinterError) -> Self {
        let warning = Warning::new(
            INPUT_ERROR_RULE,
            format!("{error} ({INPUT_ERROR_RULE})"),
            1,
            1,
        );
        Self {
            errored: true,
            warnings: vec![warning],
            ..Self::new(source)
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Records an invalid option. Marks the result errored.
    pub fn invalid_option(&mut self, text: impl Into<String>) {
        self.invalid_option_warnings.push(InvalidOptionWarning { text: text.into() });
        self.errored = true;
    }

    /// Adds a warning, marking the result errored for error severity.
    pub fn push_warning(&mut self, warning: Warning) {
        if warning.severity == Severity::Error {
            self.errored = true;
        }
        self.warnings.push(warning);
    }

    pub fn has_errors(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.severity == Severity::Warning)
            .count()
    }
}

/// Why a run failed its warning budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxWarningsExceeded {
    pub max_warnings: usize,
    pub found_warnings: usize,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub cwd: PathBuf,
    pub results: Vec<LintResult>,
    pub errored: bool,
    /// Formatter output.
    pub report: String,
    /// Output for `code` input when fixing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_warnings_exceeded: Option<MaxWarningsExceeded>,
    pub rule_metadata: BTreeMap<String, RuleMeta>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Aggregates per-input results and runs the formatter.
pub fn prepare_return_value(
    results: Vec<LintResult>,
    max_warnings: Option<usize>,
    formatter: &Formatter,
    cwd: &Path,
) -> Result<AggregateResult, LinterError> {
    let errored = results
        .iter()
        .any(|r| r.errored || !r.parse_errors.is_empty() || r.has_errors());
    let error_count = results.iter().map(LintResult::error_count).sum();
    let warning_count = results.iter().map(LintResult::warning_count).sum();

    let mut rule_metadata = BTreeMap::new();
    for result in &results {
        for (name, meta) in &result.rule_metadata {
            rule_metadata.insert(name.clone(), meta.clone());
        }
    }

    let mut aggregate = AggregateResult {
        cwd: cwd.to_path_buf(),
        results: Vec::new(),
        errored,
        report: String::new(),
        code: None,
        max_warnings_exceeded: None,
        rule_metadata,
        error_count,
        warning_count,
    };

    if let Some(max_warnings) = max_warnings
        && warning_count > max_warnings
    {
        aggregate.errored = true;
        aggregate.max_warnings_exceeded = Some(MaxWarningsExceeded {
            max_warnings,
            found_warnings: warning_count,
        });
    }

    aggregate.report = formatter.format(&results, &aggregate)?;
    aggregate.results = results;
    Ok(aggregate)
}
