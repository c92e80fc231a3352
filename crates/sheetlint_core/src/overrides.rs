//! Per-input override selection.

use std::path::Path;

use tracing::debug;

use crate::config::OVERRIDE_WITHOUT_FILES;
use crate::merge::merge_configs;
use crate::paths::{PatternSet, absolutize_glob, to_posix};
use crate::{Config, LinterError};

/// Folds every override whose `files` match `input_path` into `config`.
///
/// Globs are resolved against `root_dir`. An input also matches when a
/// slash-free pattern matches its file name. Later overrides win. The result
/// carries no `overrides`.
pub fn apply_overrides(
    config: &Config,
    root_dir: &Path,
    input_path: &Path,
) -> Result<Config, LinterError> {
    let mut result = Config {
        overrides: Vec::new(),
        ..config.clone()
    };
    let path = to_posix(input_path);

    for entry in &config.overrides {
        if entry.files.is_empty() {
            return Err(LinterError::InvalidOverrides(
                OVERRIDE_WITHOUT_FILES.to_string(),
            ));
        }

        let absolute: Vec<String> = entry
            .files
            .iter()
            .map(|glob| absolutize_glob(glob, root_dir))
            .collect();
        let matched = PatternSet::new(&absolute, false)?.is_match(&path)
            || PatternSet::new(&entry.files, true)?.is_match(&path);

        if matched {
            debug!("Override {:?} applies to {}", entry.files, path);
            result = merge_configs(&result, &entry.config);
        }
    }

    result.overrides.clear();
    Ok(result)
}
