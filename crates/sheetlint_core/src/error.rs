//! Linter error types.

use sheetlint_parser::{ParseError, SyntaxError};
use thiserror::Error;

/// Errors that can occur while resolving configuration or linting.
#[derive(Debug, Error)]
pub enum LinterError {
    /// Neither or both of `files` and `code` were given.
    #[error("You must pass sheetlint a `files` glob or a `code` string, though not both")]
    NoInput,

    /// A single-input lint got nothing to lint.
    #[error("You must provide filePath, code, or an existing root")]
    MissingSource,

    /// Input paths must be absolute. Holds the option name.
    #[error("{0} must be an absolute path")]
    NonAbsolutePath(&'static str),

    /// No configuration could be found for an input.
    #[error("Config file not found")]
    ConfigNotFound,

    /// Configuration error.
    #[error("{0}")]
    Config(String),

    /// Malformed `overrides` property.
    #[error("{0}")]
    InvalidOverrides(String),

    /// Every input matched by the patterns was ignored.
    #[error(
        "All input files were ignored because of the ignore pattern. Either change your input, ignore pattern or use \"--allow-empty-input\" to allow no inputs"
    )]
    AllFilesIgnored,

    /// The patterns matched nothing.
    #[error("No files matching the pattern \"{}\" were found.", .patterns.join(" "))]
    NoFilesFound { patterns: Vec<String> },

    /// Unknown formatter name.
    #[error(
        "You must use a valid formatter option: \"compact\", \"json\", \"string\", \"unix\" or a function"
    )]
    InvalidFormatter(String),

    /// Located syntax error in an input.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Parser failure without a location.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Plugin error.
    #[error(transparent)]
    Plugin(#[from] sheetlint_plugin::PluginError),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] sheetlint_cache::CacheError),

    /// File error.
    #[error("File error: {0}")]
    File(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinterError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a file error.
    pub fn file(message: impl Into<String>) -> Self {
        Self::File(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Whether this error rejects the whole run instead of one input's result.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Syntax(_) | Self::Parse(_) | Self::Cache(_) | Self::File(_) | Self::Io(_)
        )
    }
}

impl From<ParseError> for LinterError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Syntax(syntax) => Self::Syntax(syntax),
            other => Self::Parse(other.to_string()),
        }
    }
}
