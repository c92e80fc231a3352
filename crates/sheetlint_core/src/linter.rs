//! Core linter engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use sheetlint_cache::CacheManager;
use tracing::{debug, info, warn};

use crate::augment::{ConfigAugmenter, ResolvedConfig};
use crate::file_finder::expand_patterns;
use crate::file_linter::{LintOutcome, SourceInput};
use crate::fixer::write_if_changed;
use crate::formatters::Formatter;
use crate::ignorer::FileIgnorer;
use crate::loader::{ConfigLoader, FileConfigLoader, LoadedConfig};
use crate::paths::absolutize;
use crate::result::prepare_return_value;
use crate::{AggregateResult, LintOptions, LintResult, LinterError, Registry};

/// The core linter engine.
///
/// Owns one run's options, ignore rules, formatter and cache. Inputs are
/// linted concurrently on the calling task; the cache is the only state
/// they share.
pub struct Linter {
    pub(crate) options: LintOptions,
    pub(crate) cwd: PathBuf,
    pub(crate) registry: Arc<Registry>,
    pub(crate) loader: Arc<dyn ConfigLoader>,
    pub(crate) ignorer: FileIgnorer,
    pub(crate) formatter: Formatter,
    pub(crate) cache: Mutex<CacheManager>,
    pub(crate) use_cache: bool,
}

impl Linter {
    /// Creates a linter reading configuration files from disk.
    pub fn new(
        options: LintOptions,
        registry: impl Into<Arc<Registry>>,
    ) -> Result<Self, LinterError> {
        Self::with_loader(options, registry, Arc::new(FileConfigLoader::new()))
    }

    /// Creates a linter with a custom configuration loader.
    pub fn with_loader(
        options: LintOptions,
        registry: impl Into<Arc<Registry>>,
        loader: Arc<dyn ConfigLoader>,
    ) -> Result<Self, LinterError> {
        let current_dir = std::env::current_dir()?;
        let cwd = options
            .cwd
            .as_deref()
            .map_or_else(|| current_dir.clone(), |cwd| absolutize(cwd, &current_dir));

        let formatter = Formatter::resolve(options.formatter.as_ref())?;
        let ignorer = FileIgnorer::new(&cwd, &options.ignore_path, &options.ignore_pattern)?;

        let use_cache = options
            .cache
            .or_else(|| options.config.as_ref().and_then(|config| config.cache))
            .unwrap_or(false);

        let cache_file = CacheManager::resolve_location(&cwd, options.cache_location.as_deref());
        let mut cache = CacheManager::new(cache_file, options.cache_strategy);
        if use_cache {
            if let Err(e) = cache.load() {
                warn!("Failed to load cache: {}", e);
            }
        } else {
            cache.disable();
        }

        Ok(Self {
            options,
            cwd,
            registry: registry.into(),
            loader,
            ignorer,
            formatter,
            cache: Mutex::new(cache),
            use_cache,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn options(&self) -> &LintOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The effective configuration for an input, or for `cwd` without one.
    pub fn resolve_config(&self, file_path: Option<&Path>) -> Result<ResolvedConfig, LinterError> {
        let loaded = self.load_config(file_path)?;
        ConfigAugmenter::new(&self.registry, self.loader.as_ref(), &self.options, &self.cwd)
            .augment_full(&loaded, file_path)
    }

    /// Inline config, then `config_file`, then a search from the input.
    /// Code whose nominal path has no config falls back to `cwd`.
    fn load_config(&self, file_path: Option<&Path>) -> Result<LoadedConfig, LinterError> {
        if let Some(config) = &self.options.config {
            return Ok(LoadedConfig::inline(config.clone()));
        }

        if let Some(file) = &self.options.config_file {
            return self.loader.load_extended(&absolutize(file, &self.cwd));
        }

        if let Some(loaded) = self.loader.load(file_path.unwrap_or(&self.cwd))? {
            return Ok(loaded);
        }

        if self.options.code.is_some()
            && file_path.is_some()
            && let Some(loaded) = self.loader.load(&self.cwd)?
        {
            return Ok(loaded);
        }

        Err(LinterError::ConfigNotFound)
    }

    /// Runs the configured lint.
    pub async fn lint(&self) -> Result<AggregateResult, LinterError> {
        match (&self.options.files, &self.options.code) {
            (Some(files), None) => self.lint_files(files).await,
            (None, Some(code)) => self.lint_code(code).await,
            _ => Err(LinterError::NoInput),
        }
    }

    async fn lint_code(&self, code: &str) -> Result<AggregateResult, LinterError> {
        let code_filename = self
            .options
            .code_filename
            .as_deref()
            .map(|path| absolutize(path, &self.cwd));

        if let Some(path) = &code_filename
            && self.ignorer.is_ignored(path)
        {
            debug!("Ignoring {}", path.display());
            return self.aggregate(Vec::new());
        }

        let input = SourceInput {
            file_path: code_filename.clone(),
            code: Some(code.to_string()),
            ..SourceInput::default()
        };

        let (result, linted) = match self.lint_source(input).await {
            Ok(LintOutcome { result, output, .. }) => {
                let ignored = result.ignored;
                (result, (!ignored).then_some(output))
            }
            Err(error) => (self.error_result(code_filename, error)?, None),
        };

        let mut aggregate = self.aggregate(vec![result])?;

        let fix_requested = self
            .options
            .fix
            .or_else(|| self.options.config.as_ref().and_then(|config| config.fix))
            .unwrap_or(false);
        if let Some(output) = linted
            && (fix_requested || output.is_some())
        {
            aggregate.code = Some(output.unwrap_or_else(|| code.to_string()));
        }

        Ok(aggregate)
    }

    async fn lint_files(&self, files: &[String]) -> Result<AggregateResult, LinterError> {
        let glob_cwd = self
            .options
            .glob_cwd
            .as_deref()
            .map_or_else(|| self.cwd.clone(), |dir| absolutize(dir, &self.cwd));

        if !self.use_cache {
            let destroyed = self.cache.lock().destroy();
            if let Err(e) = destroyed {
                warn!("Failed to delete cache: {}", e);
            }
        }

        let expanded = expand_patterns(files, &glob_cwd, self.options.disable_default_ignores)?;
        let found = expanded.files.len();
        let paths: Vec<PathBuf> = expanded
            .files
            .into_iter()
            .filter(|path| !self.ignorer.is_ignored_under(path, &glob_cwd))
            .collect();

        let results = if !paths.is_empty() {
            info!("Linting {} of {} files", paths.len(), found);
            self.lint_paths(paths).await?
        } else if self.allow_empty_input()? {
            Vec::new()
        } else if found > 0 {
            return Err(LinterError::AllFilesIgnored);
        } else {
            return Err(LinterError::NoFilesFound {
                patterns: expanded.patterns,
            });
        };

        if self.use_cache {
            let saved = self.cache.lock().reconcile();
            if let Err(e) = saved {
                warn!("Failed to save cache: {}", e);
            }
        }

        self.aggregate(results)
    }

    /// Lints every path, all at once or `concurrency` at a time. Results
    /// keep the order of `paths`.
    async fn lint_paths(&self, paths: Vec<PathBuf>) -> Result<Vec<LintResult>, LinterError> {
        let tasks = paths.into_iter().map(|path| self.lint_path(path));

        let results: Vec<Result<LintResult, LinterError>> = match self.options.concurrency {
            Some(limit) if limit > 0 => stream::iter(tasks).buffered(limit).collect().await,
            _ => join_all(tasks).await,
        };

        results.into_iter().collect()
    }

    async fn lint_path(&self, path: PathBuf) -> Result<LintResult, LinterError> {
        debug!("Processing {}", path.display());

        let linted = async {
            let outcome = self
                .lint_source(SourceInput::file(&path).with_cache(self.use_cache))
                .await?;
            if !outcome.result.ignored
                && let (Some(output), Some(original)) = (&outcome.output, &outcome.original)
            {
                write_if_changed(&path, original, output).await?;
            }
            Ok::<_, LinterError>(outcome.result)
        }
        .await;

        match linted {
            Ok(result) => Ok(result),
            Err(error) => {
                self.cache.lock().remove(&path);
                self.error_result(Some(path), error)
            }
        }
    }

    /// Turns a per-input error into that input's result. Fatal errors abort
    /// the run.
    fn error_result(
        &self,
        source: Option<PathBuf>,
        error: LinterError,
    ) -> Result<LintResult, LinterError> {
        match error {
            LinterError::Syntax(syntax) => Ok(LintResult::from_syntax_error(source, &syntax)),
            error if error.is_fatal() => Err(error),
            error => {
                warn!(
                    "Failed to lint {}: {}",
                    source
                        .as_deref()
                        .map_or_else(|| "<input css>".to_string(), |p| p.display().to_string()),
                    error
                );
                Ok(LintResult::from_error(source, &error))
            }
        }
    }

    /// `allowEmptyInput` from the options, the inline config, or the config
    /// found from `cwd` with its `extends` resolved.
    fn allow_empty_input(&self) -> Result<bool, LinterError> {
        if let Some(allow) = self.options.allow_empty_input.or_else(|| {
            self.options
                .config
                .as_ref()
                .and_then(|config| config.allow_empty_input)
        }) {
            return Ok(allow);
        }

        match self.load_config(None) {
            Ok(loaded) => {
                let config = ConfigAugmenter::new(
                    &self.registry,
                    self.loader.as_ref(),
                    &self.options,
                    &self.cwd,
                )
                .augment_loaded(&loaded, None)?;
                Ok(config.allow_empty_input.unwrap_or(false))
            }
            Err(LinterError::ConfigNotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn aggregate(&self, results: Vec<LintResult>) -> Result<AggregateResult, LinterError> {
        prepare_return_value(results, self.options.max_warnings, &self.formatter, &self.cwd)
    }
}

/// Lints with a fresh [`Linter`].
pub async fn lint(
    options: LintOptions,
    registry: impl Into<Arc<Registry>>,
) -> Result<AggregateResult, LinterError> {
    Linter::new(options, registry)?.lint().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sheetlint_plugin::{RuleMeta, rule_fn};
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> Registry {
        Registry::new().with_rule(
            "color-no-red",
            rule_fn(RuleMeta::default().fixable(), |root, ctx| {
                let fix = ctx.fix();
                root.walk_decls_mut(|decl| {
                    if decl.value == "red" {
                        if fix {
                            decl.value = "green".to_string();
                        } else {
                            ctx.report("Unexpected red", decl.source.as_ref());
                        }
                    }
                });
            }),
        )
    }

    fn config() -> Config {
        Config::new().with_rule("color-no-red", json!(true))
    }

    #[tokio::test]
    async fn test_requires_exactly_one_input() {
        let temp = TempDir::new().unwrap();
        let options = LintOptions::default().with_cwd(temp.path()).with_config(config());
        let err = lint(options, registry()).await.unwrap_err();
        assert!(matches!(err, LinterError::NoInput));

        let mut both = LintOptions::for_code("a {}").with_cwd(temp.path()).with_config(config());
        both.files = Some(vec!["*.css".to_string()]);
        let err = lint(both, registry()).await.unwrap_err();
        assert!(matches!(err, LinterError::NoInput));
    }

    #[tokio::test]
    async fn test_code_input() {
        let temp = TempDir::new().unwrap();
        let options = LintOptions::for_code("a { color: red; }")
            .with_cwd(temp.path())
            .with_config(config());

        let aggregate = lint(options, registry()).await.unwrap();
        assert_eq!(aggregate.results.len(), 1);
        assert_eq!(aggregate.results[0].source, None);
        assert!(aggregate.errored);
        assert_eq!(aggregate.code, None);
    }

    #[tokio::test]
    async fn test_code_fix_returns_fixed_code() {
        let temp = TempDir::new().unwrap();
        let options = LintOptions::for_code("a { color: red; }")
            .with_cwd(temp.path())
            .with_config(config())
            .with_fix(true);

        let aggregate = lint(options, registry()).await.unwrap();
        assert!(!aggregate.errored);
        assert_eq!(aggregate.code.as_deref(), Some("a { color: green; }"));
    }

    #[tokio::test]
    async fn test_code_fix_with_writing_disabled_returns_input() {
        let temp = TempDir::new().unwrap();
        let css = "/* sheetlint-disable */\na { color: red; }";
        let options = LintOptions::for_code(css)
            .with_cwd(temp.path())
            .with_config(config())
            .with_fix(true);

        let aggregate = lint(options, registry()).await.unwrap();
        assert_eq!(aggregate.code.as_deref(), Some(css));
    }

    #[tokio::test]
    async fn test_ignored_code_filename_yields_no_results() {
        let temp = TempDir::new().unwrap();
        let options = LintOptions::for_code("a { color: red; }")
            .with_cwd(temp.path())
            .with_code_filename("vendor/a.css")
            .with_ignore_pattern("vendor/**")
            .with_config(config());

        let aggregate = lint(options, registry()).await.unwrap();
        assert!(aggregate.results.is_empty());
        assert!(!aggregate.errored);
    }

    #[tokio::test]
    async fn test_code_syntax_error_becomes_result() {
        let temp = TempDir::new().unwrap();
        let options = LintOptions::for_code("a { color: red;")
            .with_cwd(temp.path())
            .with_config(config());

        let aggregate = lint(options, registry()).await.unwrap();
        assert_eq!(aggregate.results[0].warnings[0].rule, "CssSyntaxError");
        assert!(aggregate.errored);
    }

    #[tokio::test]
    async fn test_missing_config_is_fatal() {
        let temp = TempDir::new().unwrap();
        let options = LintOptions::for_code("a {}").with_cwd(temp.path());
        let err = lint(options, registry()).await.unwrap_err();
        assert!(matches!(err, LinterError::ConfigNotFound));
    }

    #[tokio::test]
    async fn test_code_falls_back_to_cwd_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".sheetlintrc"),
            r#"{ "rules": { "color-no-red": true } }"#,
        )
        .unwrap();
        let elsewhere = TempDir::new().unwrap();

        let options = LintOptions::for_code("a { color: red; }")
            .with_cwd(temp.path())
            .with_code_filename(elsewhere.path().join("a.css"));
        let aggregate = lint(options, registry()).await.unwrap();
        assert_eq!(aggregate.results[0].warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_config_uses_config_file_option() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("custom.json"),
            r#"{ "rules": { "color-no-red": [true, { "severity": "warning" }] } }"#,
        )
        .unwrap();

        let options = LintOptions::for_code("a {}")
            .with_cwd(temp.path())
            .with_config_file("custom.json");
        let linter = Linter::new(options, registry()).unwrap();
        let resolved = linter.resolve_config(None).unwrap();

        assert_eq!(resolved.file, Some(temp.path().join("custom.json")));
        assert_eq!(
            resolved.rules["color-no-red"].severity,
            sheetlint_plugin::Severity::Warning
        );
    }

    #[tokio::test]
    async fn test_invalid_formatter_is_rejected() {
        let temp = TempDir::new().unwrap();
        let options = LintOptions::for_code("a {}")
            .with_cwd(temp.path())
            .with_config(config())
            .with_formatter("xml");
        assert!(matches!(
            Linter::new(options, registry()),
            Err(LinterError::InvalidFormatter(_))
        ));
    }
}
