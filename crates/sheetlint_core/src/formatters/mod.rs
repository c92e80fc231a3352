//! Output formatters.
//!
//! A formatter turns the per-input results into the run's `report` string.
//! Nothing is printed here.

mod compact;
mod json;
mod string;
mod unix;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::{AggregateResult, LintResult, LinterError};

/// A user-supplied formatter. Receives the results and the aggregate
/// computed so far (its `results` and `report` are still empty).
pub type FormatterFn = Arc<dyn Fn(&[LintResult], &AggregateResult) -> String + Send + Sync>;

/// The `formatter` run option.
#[derive(Clone)]
pub enum FormatterOption {
    Named(String),
    Custom(FormatterFn),
}

impl fmt::Debug for FormatterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<&str> for FormatterOption {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<FormatterFn> for FormatterOption {
    fn from(formatter: FormatterFn) -> Self {
        Self::Custom(formatter)
    }
}

/// A resolved formatter.
#[derive(Clone)]
pub enum Formatter {
    Json,
    Compact,
    String,
    Unix,
    Custom(FormatterFn),
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("Json"),
            Self::Compact => f.write_str("Compact"),
            Self::String => f.write_str("String"),
            Self::Unix => f.write_str("Unix"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Formatter {
    pub fn from_name(name: &str) -> Result<Self, LinterError> {
        match name {
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            "string" => Ok(Self::String),
            "unix" => Ok(Self::Unix),
            other => Err(LinterError::InvalidFormatter(other.to_string())),
        }
    }

    /// Resolves the run option. Defaults to JSON.
    pub fn resolve(option: Option<&FormatterOption>) -> Result<Self, LinterError> {
        match option {
            None => Ok(Self::Json),
            Some(FormatterOption::Named(name)) => Self::from_name(name),
            Some(FormatterOption::Custom(formatter)) => Ok(Self::Custom(Arc::clone(formatter))),
        }
    }

    pub fn format(
        &self,
        results: &[LintResult],
        aggregate: &AggregateResult,
    ) -> Result<String, LinterError> {
        match self {
            Self::Json => json::format(results),
            Self::Compact => Ok(compact::format(results)),
            Self::String => Ok(string::format(results, &aggregate.cwd)),
            Self::Unix => Ok(unix::format(results)),
            Self::Custom(formatter) => Ok(formatter(results, aggregate)),
        }
    }
}

/// Display name of a result's source.
fn source_name(result: &LintResult) -> String {
    result
        .source_path()
        .map_or_else(|| "<input css>".to_string(), |p| p.display().to_string())
}

/// Source relative to `cwd` when it lies below it.
fn relative_source_name(result: &LintResult, cwd: &Path) -> String {
    match result.source_path().and_then(|p| p.strip_prefix(cwd).ok()) {
        Some(relative) => relative.display().to_string(),
        None => source_name(result),
    }
}
