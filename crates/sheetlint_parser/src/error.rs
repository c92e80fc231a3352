//! Parse error types.

use std::path::PathBuf;

use thiserror::Error;

/// A located syntax error in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{}:{}: {}", self.source_name(), self.line, self.column, self.reason)]
pub struct SyntaxError {
    /// Short description, e.g. `Unclosed block`.
    pub reason: String,
    pub file: Option<PathBuf>,
    pub line: u32,
    pub column: u32,
}

impl SyntaxError {
    /// Name used as the rule of the warning produced for this error.
    pub const NAME: &'static str = "CssSyntaxError";

    pub fn new(reason: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            reason: reason.into(),
            file: None,
            line,
            column,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    fn source_name(&self) -> String {
        self.file
            .as_ref()
            .map_or_else(|| "<input css>".to_string(), |p| p.display().to_string())
    }
}

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The source text is not valid for this syntax.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The parser encountered an unsupported feature.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// An internal parser error occurred.
    #[error("Internal parser error: {0}")]
    Internal(String),
}

impl ParseError {
    /// Creates a new unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported(feature.into())
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
