//! Gitignore-style input filtering.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::debug;

use crate::LinterError;
use crate::paths::absolutize;

/// Ignore file read from `cwd` when no other is given.
pub const DEFAULT_IGNORE_FILE: &str = ".sheetlintignore";

/// Decides whether an input is ignored, from ignore files and inline
/// patterns. Patterns are relative to `cwd` unless another base is given;
/// inputs outside the base are never ignored.
#[derive(Debug, Clone)]
pub struct FileIgnorer {
    cwd: PathBuf,
    matcher: Gitignore,
}

impl FileIgnorer {
    /// Builds an ignorer from `ignore_paths` (default: `.sheetlintignore`
    /// in `cwd`, if present) and `patterns`.
    ///
    /// Explicitly named ignore files must exist.
    pub fn new(
        cwd: &Path,
        ignore_paths: &[PathBuf],
        patterns: &[String],
    ) -> Result<Self, LinterError> {
        let mut builder = GitignoreBuilder::new(cwd);

        if ignore_paths.is_empty() {
            let default = cwd.join(DEFAULT_IGNORE_FILE);
            if default.is_file() {
                add_ignore_file(&mut builder, &default)?;
            }
        } else {
            for path in ignore_paths {
                let path = absolutize(path, cwd);
                if !path.is_file() {
                    return Err(LinterError::file(format!(
                        "No such ignore file: {}",
                        path.display()
                    )));
                }
                add_ignore_file(&mut builder, &path)?;
            }
        }

        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| LinterError::config(format!("Invalid ignore pattern: {e}")))?;
        }

        let matcher = builder
            .build()
            .map_err(|e| LinterError::config(format!("Failed to build ignore rules: {e}")))?;

        Ok(Self {
            cwd: cwd.to_path_buf(),
            matcher,
        })
    }

    /// `path` must be absolute.
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.is_ignored_under(path, &self.cwd)
    }

    /// Like [`is_ignored`](Self::is_ignored), with patterns taken relative
    /// to `base` instead of `cwd`. File inputs are checked against `globCwd`.
    pub fn is_ignored_under(&self, path: &Path, base: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(base) else {
            return false;
        };
        if relative.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative, false)
            .is_ignore()
    }
}

fn add_ignore_file(builder: &mut GitignoreBuilder, path: &Path) -> Result<(), LinterError> {
    debug!("Reading ignore file {}", path.display());
    match builder.add(path) {
        Some(err) => Err(LinterError::config(format!(
            "Failed to read ignore file {}: {err}",
            path.display()
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_ignore_file_and_inline_patterns() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(DEFAULT_IGNORE_FILE), "vendor/\n*.min.css\n").unwrap();

        let ignorer =
            FileIgnorer::new(temp.path(), &[], &["legacy/**".to_string()]).unwrap();

        assert!(ignorer.is_ignored(&temp.path().join("vendor/a.css")));
        assert!(ignorer.is_ignored(&temp.path().join("src/app.min.css")));
        assert!(ignorer.is_ignored(&temp.path().join("legacy/x/y.css")));
        assert!(!ignorer.is_ignored(&temp.path().join("src/app.css")));
    }

    #[test]
    fn negation_reincludes() {
        let temp = TempDir::new().unwrap();
        let ignorer = FileIgnorer::new(
            temp.path(),
            &[],
            &["*.css".to_string(), "!keep.css".to_string()],
        )
        .unwrap();
        assert!(ignorer.is_ignored(&temp.path().join("drop.css")));
        assert!(!ignorer.is_ignored(&temp.path().join("keep.css")));
    }

    #[test]
    fn explicit_ignore_path_is_relative_to_cwd() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("custom-ignore"), "generated/\n").unwrap();

        let ignorer =
            FileIgnorer::new(temp.path(), &[PathBuf::from("custom-ignore")], &[]).unwrap();
        assert!(ignorer.is_ignored(&temp.path().join("generated/a.css")));
    }

    #[test]
    fn missing_explicit_ignore_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(FileIgnorer::new(temp.path(), &[PathBuf::from("nope")], &[]).is_err());
    }

    #[test]
    fn patterns_follow_the_given_base() {
        let temp = TempDir::new().unwrap();
        let ignorer = FileIgnorer::new(temp.path(), &[], &["/vendor".to_string()]).unwrap();
        let base = temp.path().join("packages");

        assert!(ignorer.is_ignored_under(&base.join("vendor/a.css"), &base));
        assert!(!ignorer.is_ignored(&base.join("vendor/a.css")));
        assert!(!ignorer.is_ignored_under(&temp.path().join("vendor/a.css"), &base));
    }

    #[test]
    fn paths_outside_cwd_are_not_ignored() {
        let temp = TempDir::new().unwrap();
        let ignorer = FileIgnorer::new(temp.path(), &[], &["*.css".to_string()]).unwrap();
        assert!(!ignorer.is_ignored(Path::new("/somewhere/else/a.css")));
    }
}
