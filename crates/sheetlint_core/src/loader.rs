//! Configuration file discovery and loading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::{Config, LinterError};

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".sheetlintrc",
    ".sheetlintrc.json",
    "sheetlint.config.json",
];

/// A configuration and the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,
    /// `None` for inline configurations.
    pub file: Option<PathBuf>,
}

impl LoadedConfig {
    pub fn new(config: Config, file: impl Into<PathBuf>) -> Self {
        Self {
            config,
            file: Some(file.into()),
        }
    }

    pub fn inline(config: Config) -> Self {
        Self { config, file: None }
    }

    /// Directory relative paths in this configuration resolve against.
    pub fn dir(&self) -> Option<&Path> {
        self.file.as_deref().and_then(Path::parent)
    }
}

/// Finds and reads configurations.
pub trait ConfigLoader: Send + Sync {
    /// Searches from `search_path` (a file or directory) upward.
    fn load(&self, search_path: &Path) -> Result<Option<LoadedConfig>, LinterError>;

    /// Reads the configuration at exactly `path`.
    fn load_extended(&self, path: &Path) -> Result<LoadedConfig, LinterError>;
}

/// Reads JSONC configuration files from disk, memoizing both searches and
/// reads for the lifetime of the loader.
#[derive(Debug, Default)]
pub struct FileConfigLoader {
    searches: Mutex<HashMap<PathBuf, Option<LoadedConfig>>>,
    files: Mutex<HashMap<PathBuf, LoadedConfig>>,
}

impl FileConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses one configuration file.
    pub fn read(path: &Path) -> Result<LoadedConfig, LinterError> {
        let content = fs::read_to_string(path).map_err(|e| {
            LinterError::config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config = Config::from_jsonc(&content).map_err(|e| match e {
            LinterError::Config(message) => {
                LinterError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;
        Ok(LoadedConfig::new(config, path))
    }

    fn search(dir: &Path) -> Result<Option<LoadedConfig>, LinterError> {
        for ancestor in dir.ancestors() {
            for name in CONFIG_FILE_NAMES {
                let candidate = ancestor.join(name);
                if candidate.is_file() {
                    debug!("Found config {}", candidate.display());
                    return Self::read(&candidate).map(Some);
                }
            }
        }
        Ok(None)
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self, search_path: &Path) -> Result<Option<LoadedConfig>, LinterError> {
        let dir = if search_path.is_dir() {
            search_path
        } else {
            search_path.parent().unwrap_or(search_path)
        };

        if let Some(found) = self.searches.lock().get(dir) {
            return Ok(found.clone());
        }

        let found = Self::search(dir)?;
        self.searches.lock().insert(dir.to_path_buf(), found.clone());
        Ok(found)
    }

    fn load_extended(&self, path: &Path) -> Result<LoadedConfig, LinterError> {
        if let Some(loaded) = self.files.lock().get(path) {
            return Ok(loaded.clone());
        }

        let loaded = Self::read(path)?;
        self.files.lock().insert(path.to_path_buf(), loaded.clone());
        Ok(loaded)
    }
}
