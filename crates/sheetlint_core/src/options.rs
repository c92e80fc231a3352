//! Run options.

use std::path::PathBuf;

use serde_json::Value;
use sheetlint_cache::CacheStrategy;

use crate::Config;
use crate::formatters::FormatterOption;

/// Options for one lint run.
///
/// Exactly one of `files` and `code` must be set.
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// Glob patterns or paths, relative to `glob_cwd`.
    pub files: Option<Vec<String>>,
    /// Source text to lint instead of files.
    pub code: Option<String>,
    /// Nominal path of `code`, used for config lookup, overrides and ignores.
    pub code_filename: Option<PathBuf>,

    /// Inline configuration. Skips config file lookup.
    pub config: Option<Config>,
    /// Explicit configuration file. Skips the upward search.
    pub config_file: Option<PathBuf>,
    /// Base directory for relative paths in an inline `config`.
    pub config_basedir: Option<PathBuf>,

    /// Working directory. Defaults to the process's current directory.
    pub cwd: Option<PathBuf>,
    /// Directory globs are expanded against. Defaults to `cwd`.
    pub glob_cwd: Option<PathBuf>,

    pub cache: Option<bool>,
    /// Cache file, or a directory to place it in.
    pub cache_location: Option<PathBuf>,
    pub cache_strategy: CacheStrategy,

    pub fix: Option<bool>,
    /// Fail the run once more than this many warning-severity problems exist.
    pub max_warnings: Option<usize>,
    /// Defaults to `json`.
    pub formatter: Option<FormatterOption>,
    pub allow_empty_input: Option<bool>,

    /// Stop excluding `node_modules`.
    pub disable_default_ignores: bool,
    /// Ignore files to use instead of `.sheetlintignore`.
    pub ignore_path: Vec<PathBuf>,
    /// Extra gitignore-style patterns.
    pub ignore_pattern: Vec<String>,

    pub ignore_disables: bool,
    pub quiet: bool,
    pub quiet_deprecation_warnings: bool,
    pub report_needless_disables: Option<Value>,
    pub report_invalid_scope_disables: Option<Value>,
    pub report_descriptionless_disables: Option<Value>,
    pub custom_syntax: Option<String>,

    /// Maximum number of inputs in flight. Unbounded when unset.
    pub concurrency: Option<usize>,
}

impl LintOptions {
    /// Options linting the files matched by `patterns`.
    pub fn for_files<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: Some(patterns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Options linting `code`.
    pub fn for_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn with_code_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.code_filename = Some(path.into());
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_config_basedir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_basedir = Some(path.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_glob_cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.glob_cwd = Some(path.into());
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = Some(enabled);
        self
    }

    pub fn with_cache_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_location = Some(path.into());
        self
    }

    pub fn with_cache_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.cache_strategy = strategy;
        self
    }

    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn with_max_warnings(mut self, max: usize) -> Self {
        self.max_warnings = Some(max);
        self
    }

    pub fn with_formatter(mut self, formatter: impl Into<FormatterOption>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    pub fn with_allow_empty_input(mut self, allow: bool) -> Self {
        self.allow_empty_input = Some(allow);
        self
    }

    pub fn with_ignore_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_path.push(path.into());
        self
    }

    pub fn with_ignore_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_pattern.push(pattern.into());
        self
    }

    pub fn with_custom_syntax(mut self, name: impl Into<String>) -> Self {
        self.custom_syntax = Some(name.into());
        self
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit);
        self
    }
}
