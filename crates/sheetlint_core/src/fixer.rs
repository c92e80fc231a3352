//! Writes fixed output back to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::LinterError;

/// Result of a write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixerResult {
    pub path: PathBuf,
    /// Whether the file was rewritten.
    pub modified: bool,
}

/// Replaces the contents of `path` with `fixed` when it differs from
/// `original`.
///
/// The new content goes to a temporary file next to `path` which is then
/// renamed over it, so readers never observe a partial write.
pub async fn write_if_changed(
    path: &Path,
    original: &str,
    fixed: &str,
) -> Result<FixerResult, LinterError> {
    if original == fixed {
        return Ok(FixerResult {
            path: path.to_path_buf(),
            modified: false,
        });
    }

    let target = path.to_path_buf();
    let content = fixed.to_string();
    tokio::task::spawn_blocking(move || write_atomic(&target, &content))
        .await
        .map_err(|e| LinterError::Internal(format!("Fix write task failed: {e}")))??;

    debug!("Wrote fixes to {}", path.display());
    Ok(FixerResult {
        path: path.to_path_buf(),
        modified: true,
    })
}

fn write_atomic(path: &Path, content: &str) -> Result<(), LinterError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write_error =
        |e: std::io::Error| LinterError::file(format!("Failed to write {}: {}", path.display(), e));

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
