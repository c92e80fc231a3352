//! Path and glob helpers.
//!
//! Everything that is matched against a glob is first made absolute and
//! converted to forward slashes, so patterns behave the same on every
//! platform.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::LinterError;

/// Converts a path to a forward-slash string.
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lexically resolves `.` and `..` components without touching the
/// file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Joins `path` onto `base` unless it is already absolute, then normalizes.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Makes a glob absolute against `base`, keeping a leading `!`.
///
/// `base` is a literal directory: its glob metacharacters are escaped.
/// Leading `..` components of a relative glob climb out of `base`.
pub fn absolutize_glob(glob: &str, base: &Path) -> String {
    let (negated, pattern) = match glob.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, glob),
    };
    let pattern = Path::new(pattern);
    let absolute = if pattern.is_absolute() {
        to_posix(&normalize_path(pattern))
    } else {
        let mut base = normalize_path(base);
        let mut rest: Vec<String> = Vec::new();
        for component in normalize_path(pattern).components() {
            match component {
                Component::ParentDir if rest.is_empty() => {
                    base.pop();
                }
                Component::CurDir => {}
                other => rest.push(other.as_os_str().to_string_lossy().into_owned()),
            }
        }
        let base = globset::escape(&to_posix(&base));
        let base = base.trim_end_matches('/');
        if rest.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{}", rest.join("/"))
        }
    };
    if negated {
        format!("!{absolute}")
    } else {
        absolute
    }
}

/// True for `./x`, `../x` and absolute paths, as opposed to bare names.
pub fn is_path_like(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || ["./", "../", ".\\", "..\\"]
            .iter()
            .any(|prefix| specifier.starts_with(prefix))
        || Path::new(specifier).is_absolute()
}

/// `path` relative to `base` in forward-slash form, if it lies under it.
pub fn relative_posix(path: &Path, base: &Path) -> Option<String> {
    path.strip_prefix(base).ok().map(to_posix)
}

struct Pattern {
    matcher: GlobMatcher,
    negated: bool,
    basename: bool,
}

impl Pattern {
    fn is_match(&self, path: &str) -> bool {
        let candidate = if self.basename {
            path.rsplit('/').next().unwrap_or(path)
        } else {
            path
        };
        self.matcher.is_match(candidate) != self.negated
    }
}

/// A list of globs that matches when any one of them does.
///
/// A `!pattern` entry matches every path the pattern does not. `*` never
/// crosses `/`, dotfiles are not special, and with `match_base` a pattern
/// without a slash is tested against the file name only.
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S], match_base: bool) -> Result<Self, LinterError> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                let (negated, pattern) = match raw.strip_prefix('!') {
                    Some(rest) => (true, rest),
                    None => (false, raw),
                };
                let matcher = GlobBuilder::new(pattern)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| LinterError::config(format!("Invalid glob pattern: {e}")))?
                    .compile_matcher();
                Ok(Pattern {
                    matcher,
                    negated,
                    basename: match_base && !pattern.contains('/'),
                })
            })
            .collect::<Result<Vec<_>, LinterError>>()?;
        Ok(Self { patterns })
    }

    /// `path` must use forward slashes.
    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }
}
