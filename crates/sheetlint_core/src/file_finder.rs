//! Expands `files` patterns into input paths.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::info;
use walkdir::WalkDir;

use crate::error::LinterError;
use crate::paths::{absolutize, absolutize_glob, to_posix};

/// Globs excluded unless default ignores are disabled.
pub const ALWAYS_IGNORED_GLOBS: &[&str] = &["**/node_modules/**"];

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '!'];

/// Files found for a set of patterns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expanded {
    /// Absolute paths, sorted and deduplicated.
    pub files: Vec<PathBuf>,
    /// The patterns actually matched: literal paths escaped, default
    /// ignores appended.
    pub patterns: Vec<String>,
}

/// Expands `entries` against `glob_cwd`.
///
/// Entries naming an existing file are taken literally; an existing
/// directory stands for everything below it. A leading `!` excludes.
pub fn expand_patterns(
    entries: &[String],
    glob_cwd: &Path,
    disable_default_ignores: bool,
) -> Result<Expanded, LinterError> {
    let mut patterns: Vec<String> = entries
        .iter()
        .map(|entry| {
            if entry.starts_with('!') {
                return entry.clone();
            }
            let absolute = absolutize(Path::new(entry), glob_cwd);
            if absolute.is_file() {
                globset::escape(&to_posix(Path::new(entry)))
            } else if absolute.is_dir() {
                format!(
                    "{}/**",
                    globset::escape(to_posix(Path::new(entry)).trim_end_matches('/'))
                )
            } else {
                entry.clone()
            }
        })
        .collect();

    if !disable_default_ignores {
        patterns.extend(ALWAYS_IGNORED_GLOBS.iter().map(|glob| format!("!{glob}")));
    }

    let (exclude, include): (Vec<String>, Vec<String>) = patterns
        .iter()
        .map(|pattern| absolutize_glob(pattern, glob_cwd))
        .partition(|pattern| pattern.starts_with('!'));
    let exclude: Vec<String> = exclude
        .into_iter()
        .map(|pattern| pattern[1..].to_string())
        .collect();

    let finder = FileFinder::new(&include, &exclude)?.skip_node_modules(!disable_default_ignores);
    let files = finder.discover_files(&include);

    Ok(Expanded { files, patterns })
}

/// Walks the file system for files matching absolute globs.
pub struct FileFinder {
    include_globs: Option<GlobSet>,
    exclude_globs: Option<GlobSet>,
    skip_node_modules: bool,
}

impl FileFinder {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, LinterError> {
        let include_globs = Self::build_globset(include)?;
        let exclude_globs = Self::build_globset(exclude)?;

        Ok(Self {
            include_globs,
            exclude_globs,
            skip_node_modules: false,
        })
    }

    /// Prunes `node_modules` directories while walking.
    pub fn skip_node_modules(mut self, skip: bool) -> Self {
        self.skip_node_modules = skip;
        self
    }

    fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, LinterError> {
        if patterns.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| LinterError::config(format!("Invalid pattern '{}': {}", pattern, e)))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| LinterError::config(format!("Failed to build globset: {}", e)))?;

        Ok(Some(globset))
    }

    /// Checks an absolute, forward-slash path against the globs.
    pub fn is_match(&self, path: &str) -> bool {
        if self
            .exclude_globs
            .as_ref()
            .is_some_and(|excludes| excludes.is_match(path))
        {
            return false;
        }

        self.include_globs
            .as_ref()
            .is_some_and(|includes| includes.is_match(path))
    }

    /// Walks the static prefix of every include pattern.
    pub fn discover_files(&self, include: &[String]) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = include.iter().map(|p| static_prefix(p)).collect();
        roots.sort();
        roots.dedup();
        let roots: Vec<PathBuf> = roots
            .iter()
            .filter(|root| {
                !roots
                    .iter()
                    .any(|other| other != *root && root.starts_with(other))
            })
            .cloned()
            .collect();

        let skip_node_modules = self.skip_node_modules;
        let mut files = Vec::new();
        for root in roots {
            let walker = WalkDir::new(&root)
                .follow_links(false)
                .into_iter()
                .filter_entry(|entry| {
                    !(skip_node_modules
                        && entry.depth() > 0
                        && entry.file_type().is_dir()
                        && entry.file_name() == "node_modules")
                })
                .filter_map(|e| e.ok());

            for entry in walker {
                if entry.file_type().is_file() && self.is_match(&to_posix(entry.path())) {
                    files.push(entry.into_path());
                }
            }
        }

        files.sort();
        files.dedup();

        info!("Discovered {} files to lint", files.len());
        files
    }
}

/// Leading components of an absolute glob that contain no glob syntax.
fn static_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    let components: Vec<&str> = pattern.split('/').collect();
    for (i, component) in components.iter().enumerate() {
        let Some(component) = unescape_literal(component) else {
            break;
        };
        // The last component is a file name, not a directory to walk.
        if i + 1 == components.len() {
            break;
        }
        if i == 0 && component.is_empty() {
            prefix.push("/");
        } else {
            prefix.push(component);
        }
    }
    prefix
}

/// The literal text of a glob component, undoing `[c]` escapes. `None` if
/// the component holds real glob syntax.
fn unescape_literal(component: &str) -> Option<String> {
    let chars: Vec<char> = component.chars().collect();
    let mut literal = String::with_capacity(component.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i..] {
            ['[', c, ']', ..] if GLOB_META.contains(&c) => {
                literal.push(c);
                i += 3;
            }
            [c, ..] if GLOB_META.contains(&c) || c == '\\' => return None,
            [c, ..] => {
                literal.push(c);
                i += 1;
            }
            [] => break,
        }
    }
    Some(literal)
}
