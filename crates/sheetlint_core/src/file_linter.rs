//! Single input linting logic.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sheetlint_ast::Root;
use sheetlint_plugin::{RuleContext, Severity, Warning};
use tracing::debug;

use crate::augment::ResolvedConfig;
use crate::config::is_truthy;
use crate::disables::{apply_disables, collect_disabled_ranges, report_disables};
use crate::linter::Linter;
use crate::paths::{PatternSet, to_posix};
use crate::result::Deprecation;
use crate::{LintResult, LinterError};

/// One input for [`Linter::lint_source`].
#[derive(Debug, Clone, Default)]
pub struct SourceInput {
    /// Absolute path of the input. For code, its nominal file name.
    pub file_path: Option<PathBuf>,
    /// Source text. When absent, `file_path` is read.
    pub code: Option<String>,
    /// A tree parsed by the caller. Skips reading and parsing.
    pub root: Option<Root>,
    /// Consult and update the cache. Only file inputs are cached.
    pub cache: bool,
}

impl SourceInput {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_root(mut self, root: Root) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }
}

/// What linting one input produced.
#[derive(Debug, Clone, Default)]
pub struct LintOutcome {
    pub result: LintResult,
    /// Serialized tree, when fixing and writing fixes is allowed.
    pub output: Option<String>,
    /// Text the tree was parsed from.
    pub original: Option<String>,
    /// The linted tree. For ignored inputs, the tree the caller supplied.
    pub root: Option<Root>,
}

impl LintOutcome {
    fn skipped(result: LintResult, root: Option<Root>) -> Self {
        Self {
            result,
            root,
            ..Self::default()
        }
    }
}

impl Linter {
    /// Lints a single input.
    ///
    /// Ignored and cache-hit inputs yield an empty `ignored` result. Syntax
    /// and read errors are returned as errors.
    pub async fn lint_source(&self, input: SourceInput) -> Result<LintOutcome, LinterError> {
        let SourceInput {
            file_path,
            code,
            root,
            cache,
        } = input;

        if file_path.is_none() && code.is_none() && root.is_none() {
            return Err(LinterError::MissingSource);
        }

        if let Some(path) = &file_path
            && !path.is_absolute()
        {
            let option = if code.is_some() {
                "codeFilename"
            } else {
                "filePath"
            };
            return Err(LinterError::NonAbsolutePath(option));
        }

        if let Some(path) = &file_path
            && self.ignorer.is_ignored(path)
        {
            debug!("Ignoring {}", path.display());
            return Ok(LintOutcome::skipped(LintResult::ignored(file_path), root));
        }

        let resolved = self.resolve_config(file_path.as_deref())?;

        if let Some(path) = &file_path
            && is_ignored_by_config(&resolved, path)?
        {
            debug!("Ignoring {} (ignoreFiles)", path.display());
            return Ok(LintOutcome::skipped(LintResult::ignored(file_path), root));
        }

        let cache_path = file_path
            .as_deref()
            .filter(|_| cache && code.is_none() && root.is_none());

        let text = match (&code, &root, &file_path) {
            (Some(code), _, _) => Some(code.clone()),
            (None, None, Some(path)) => Some(read_source(path).await?),
            _ => None,
        };

        let fingerprint = match (cache_path, &text) {
            (Some(path), Some(text)) => {
                let fingerprint = self.cache.lock().fingerprint(path, text)?;
                if self
                    .cache
                    .lock()
                    .is_unchanged(path, &fingerprint, &resolved.hash)
                {
                    debug!("Using cached result for {}", path.display());
                    return Ok(LintOutcome::skipped(LintResult::cached(file_path), None));
                }
                Some(fingerprint)
            }
            _ => None,
        };

        debug!(
            "Linting {}",
            file_path
                .as_deref()
                .map_or_else(|| "<input css>".to_string(), |p| p.display().to_string())
        );

        let parser = self
            .registry
            .parser_for(resolved.config.custom_syntax.as_deref(), file_path.as_deref())?;

        let (mut root, original) = match (root, text) {
            (Some(root), text) => {
                let original = text.unwrap_or_else(|| parser.stringify(&root));
                (root, original)
            }
            (None, Some(text)) => (parser.parse(&text, file_path.as_deref())?, text),
            (None, None) => return Err(LinterError::MissingSource),
        };

        let mut result = LintResult::new(file_path.clone());
        let ranges = collect_disabled_ranges(&root);
        let (warnings, fixed_rules) =
            self.run_rules(&mut root, &resolved, file_path.as_deref(), &mut result);

        let (warnings, used) = if resolved.ignore_disables() {
            (warnings, vec![false; ranges.len()])
        } else {
            apply_disables(warnings, &ranges)
        };
        for warning in warnings {
            result.push_warning(warning);
        }
        report_disables(&mut result, &resolved.config, &ranges, &used, |rule| {
            resolved.rules.contains_key(rule)
        });

        // No write-back when a disabled range covers a rule that fixed.
        let writing_disabled = ranges.iter().any(|range| {
            range
                .rule
                .as_ref()
                .is_none_or(|rule| fixed_rules.contains(rule))
        });
        result.disabled_ranges = ranges;

        let output = (resolved.fix() && !writing_disabled).then(|| parser.stringify(&root));

        if let (Some(path), Some(fingerprint)) = (cache_path, fingerprint) {
            let mut cache = self.cache.lock();
            if result.warnings.is_empty() && !result.errored {
                cache.set(path, &fingerprint, &resolved.hash);
            } else {
                debug!(
                    "{} contains linting errors and will not be cached",
                    path.display()
                );
                cache.remove(path);
            }
        }

        Ok(LintOutcome {
            result,
            output,
            original: Some(original),
            root: Some(root),
        })
    }

    /// Runs every resolved rule over `root`. Returns the raw warnings and the
    /// rules that ran with fixing on.
    fn run_rules(
        &self,
        root: &mut Root,
        resolved: &ResolvedConfig,
        file: Option<&Path>,
        result: &mut LintResult,
    ) -> (Vec<Warning>, HashSet<String>) {
        let mut warnings = Vec::new();
        let mut fixed_rules = HashSet::new();
        let quiet = resolved.quiet();

        for (name, settings) in &resolved.rules {
            if quiet && settings.severity != Severity::Error {
                continue;
            }

            let Some(rule) = resolved
                .plugin_functions
                .get(name)
                .cloned()
                .or_else(|| self.registry.rule(name))
            else {
                warnings.push(Warning::new(name.as_str(), format!("Unknown rule {name}."), 1, 1));
                continue;
            };

            let meta = rule.meta();
            if meta.deprecated {
                result.deprecations.push(Deprecation {
                    text: format!("The \"{name}\" rule is deprecated."),
                    reference: meta.url.clone(),
                });
            }

            let fix = resolved.fix()
                && !settings
                    .secondary
                    .get("disableFix")
                    .is_some_and(is_truthy);

            let mut ctx = RuleContext::new(
                name.as_str(),
                settings.primary.clone(),
                settings.secondary.clone(),
                settings.severity,
            )
            .with_fix(fix)
            .with_file(file.map(Path::to_path_buf));

            rule.check(root, &mut ctx);

            let output = ctx.into_output();
            for text in output.invalid_options {
                result.invalid_option(text);
            }
            warnings.extend(output.warnings);

            if fix && meta.fixable {
                fixed_rules.insert(name.clone());
            }
            result.rule_severities.insert(name.clone(), settings.severity);
            if let Some(message) = settings.secondary.get("message").and_then(Value::as_str) {
                result
                    .custom_messages
                    .insert(name.clone(), message.to_string());
            }
            result.rule_metadata.insert(name.clone(), meta);
        }

        (warnings, fixed_rules)
    }
}

fn is_ignored_by_config(resolved: &ResolvedConfig, path: &Path) -> Result<bool, LinterError> {
    match &resolved.config.ignore_files {
        Some(globs) if !globs.is_empty() => {
            Ok(PatternSet::new(globs, false)?.is_match(&to_posix(path)))
        }
        _ => Ok(false),
    }
}

async fn read_source(path: &Path) -> Result<String, LinterError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LinterError::file(format!("Failed to read {}: {}", path.display(), e)))
}
