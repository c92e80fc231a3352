//! Diagnostic types for lint results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sheetlint_ast::{Location, Position};

use crate::PluginError;

/// Severity level for warnings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the run.
    #[default]
    Error,
    /// Reported but does not fail the run on its own.
    Warning,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            other => Err(PluginError::InvalidSeverity(other.to_string())),
        }
    }
}

/// A problem reported against an input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    /// The rule that generated this warning.
    pub rule: String,

    /// The message, usually ending in ` (rule-name)`.
    pub text: String,

    #[serde(default)]
    pub severity: Severity,

    /// 1-indexed line.
    pub line: u32,

    /// 1-indexed column.
    pub column: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

impl Warning {
    /// Creates a new error-severity warning at `line:column`.
    pub fn new(rule: impl Into<String>, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            rule: rule.into(),
            text: text.into(),
            severity: Severity::Error,
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    /// Creates a warning spanning `loc`.
    pub fn at(rule: impl Into<String>, text: impl Into<String>, loc: Location) -> Self {
        Self::new(rule, text, loc.start.line, loc.start.column).with_end(loc.end)
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the end position.
    pub fn with_end(mut self, end: Position) -> Self {
        self.end_line = Some(end.line);
        self.end_column = Some(end.column);
        self
    }

    /// Start position of the warning.
    pub const fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}
