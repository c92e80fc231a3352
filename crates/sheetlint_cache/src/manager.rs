//! Cache manager for file-level caching.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{debug, info};

use crate::{CacheEntry, CacheError, CacheStrategy};

/// File name used when no cache location is given.
pub const DEFAULT_CACHE_FILE: &str = ".sheetlintcache";

/// Manages the lint cache for all inputs of a run.
///
/// Entries are keyed by absolute path.
#[derive(Debug)]
pub struct CacheManager {
    /// File the cache is persisted to.
    cache_file: PathBuf,
    strategy: CacheStrategy,
    /// In-memory cache entries.
    entries: HashMap<String, CacheEntry>,
    /// Paths looked up since the cache was loaded.
    visited: HashSet<String>,
    enabled: bool,
}

impl CacheManager {
    /// Creates an empty cache manager persisting to `cache_file`.
    pub fn new(cache_file: impl Into<PathBuf>, strategy: CacheStrategy) -> Self {
        Self {
            cache_file: cache_file.into(),
            strategy,
            entries: HashMap::new(),
            visited: HashSet::new(),
            enabled: true,
        }
    }

    /// Resolves the cache file for a run in `cwd`.
    ///
    /// A location that is an existing directory, or that ends with a path
    /// separator, gets a per-`cwd` file name inside it.
    pub fn resolve_location(cwd: &Path, location: Option<&Path>) -> PathBuf {
        let Some(location) = location else {
            return cwd.join(DEFAULT_CACHE_FILE);
        };
        let absolute = cwd.join(location);
        let raw = location.to_string_lossy();
        let is_dir = absolute.is_dir() || raw.ends_with('/') || raw.ends_with(MAIN_SEPARATOR);
        if is_dir {
            let hash = Self::hash_content(&cwd.to_string_lossy());
            absolute.join(format!(".cache_{}", &hash[..8]))
        } else {
            absolute
        }
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    pub fn strategy(&self) -> CacheStrategy {
        self.strategy
    }

    /// Disables caching.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Enables caching.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Returns whether caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Computes the BLAKE3 hash of content.
    pub fn hash_content(content: &str) -> String {
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }

    /// Fingerprints the input at `path` under the configured strategy.
    ///
    /// `content` is only hashed for [`CacheStrategy::Content`].
    pub fn fingerprint(&self, path: &Path, content: &str) -> Result<String, CacheError> {
        match self.strategy {
            CacheStrategy::Content => Ok(Self::hash_content(content)),
            CacheStrategy::Metadata => {
                let meta = fs::metadata(path)
                    .map_err(|e| CacheError::read(format!("{}: {e}", path.display())))?;
                let mtime = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map_or(0, |d| d.as_nanos());
                Ok(Self::hash_content(&format!("{mtime}:{}", meta.len())))
            }
        }
    }

    /// Gets a cached entry for a file.
    pub fn get(&self, path: &Path) -> Option<&CacheEntry> {
        if !self.enabled {
            return None;
        }
        self.entries.get(&key(path))
    }

    /// Returns true if `path` was cached clean with the same fingerprint and
    /// configuration. Marks `path` as visited either way.
    pub fn is_unchanged(&mut self, path: &Path, fingerprint: &str, config_hash: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let key = key(path);
        let unchanged = self
            .entries
            .get(&key)
            .is_some_and(|entry| entry.is_valid(fingerprint, config_hash));
        self.visited.insert(key);
        unchanged
    }

    /// Records a clean lint of `path`.
    pub fn set(&mut self, path: &Path, fingerprint: &str, config_hash: &str) {
        if self.enabled {
            let key = key(path);
            self.entries
                .insert(key.clone(), CacheEntry::new(fingerprint, config_hash));
            self.visited.insert(key);
        }
    }

    /// Removes a cache entry.
    pub fn remove(&mut self, path: &Path) {
        self.entries.remove(&key(path));
    }

    /// Clears all cache entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.visited.clear();
    }

    /// Loads cache from disk.
    ///
    /// A missing file is an empty cache.
    pub fn load(&mut self) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }

        if !self.cache_file.exists() {
            debug!("No cache file found at {}", self.cache_file.display());
            return Ok(());
        }

        let content = fs::read(&self.cache_file)?;
        let mut aligned = rkyv::util::AlignedVec::<16>::new();
        aligned.extend_from_slice(&content);
        let entries: HashMap<String, CacheEntry> =
            rkyv::from_bytes::<_, rkyv::rancor::Error>(&aligned)
                .map_err(|e| CacheError::corrupted(e.to_string()))?;

        info!("Loaded {} cache entries", entries.len());
        self.entries = entries;
        self.visited.clear();

        Ok(())
    }

    /// Saves cache to disk, replacing the file atomically.
    pub fn save(&self) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }

        if let Some(parent) = self.cache_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&self.entries)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let temp_path = self.cache_file.with_extension("tmp");
        fs::write(&temp_path, &bytes)?;
        fs::rename(&temp_path, &self.cache_file)?;

        info!(
            "Saved {} cache entries to {}",
            self.entries.len(),
            self.cache_file.display()
        );

        Ok(())
    }

    /// Drops entries for paths not visited since loading, then saves.
    pub fn reconcile(&mut self) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        let before = self.entries.len();
        let visited = &self.visited;
        self.entries.retain(|key, _| visited.contains(key));
        if before != self.entries.len() {
            debug!("Pruned {} stale cache entries", before - self.entries.len());
        }
        self.save()
    }

    /// Clears the cache and deletes the cache file.
    pub fn destroy(&mut self) -> Result<(), CacheError> {
        self.clear();
        match fs::remove_file(&self.cache_file) {
            Ok(()) => {
                debug!("Deleted cache file {}", self.cache_file.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn manager_in(dir: &Path) -> CacheManager {
        CacheManager::new(dir.join(DEFAULT_CACHE_FILE), CacheStrategy::Content)
    }

    #[test]
    fn new_manager_is_enabled_and_empty() {
        let manager = CacheManager::new("/tmp/cache", CacheStrategy::default());
        assert!(manager.is_enabled());
        assert!(manager.is_empty());
        assert_eq!(manager.strategy(), CacheStrategy::Metadata);
    }

    #[test]
    fn resolve_location_defaults_to_cwd() {
        let cwd = Path::new("/project");
        assert_eq!(
            CacheManager::resolve_location(cwd, None),
            PathBuf::from("/project/.sheetlintcache")
        );
        assert_eq!(
            CacheManager::resolve_location(cwd, Some(Path::new("tmp/lint.cache"))),
            PathBuf::from("/project/tmp/lint.cache")
        );
    }

    #[test]
    fn resolve_location_directory_gets_hashed_file_name() {
        let dir = tempdir().unwrap();
        let resolved = CacheManager::resolve_location(dir.path(), Some(dir.path()));
        let name = resolved.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(".cache_"));
        assert_eq!(name.len(), ".cache_".len() + 8);
        assert_eq!(resolved.parent(), Some(dir.path()));

        let trailing = CacheManager::resolve_location(Path::new("/p"), Some(Path::new("out/")));
        assert!(trailing.starts_with("/p/out"));
        assert!(trailing.to_string_lossy().contains(".cache_"));
    }

    #[test]
    fn is_unchanged_requires_matching_hashes() {
        let mut manager = CacheManager::new("/tmp/cache", CacheStrategy::Content);
        let path = Path::new("/project/a.css");
        assert!(!manager.is_unchanged(path, "f", "c"));

        manager.set(path, "f", "c");
        assert!(manager.is_unchanged(path, "f", "c"));
        assert!(!manager.is_unchanged(path, "f2", "c"));
        assert!(!manager.is_unchanged(path, "f", "c2"));

        manager.remove(path);
        assert!(!manager.is_unchanged(path, "f", "c"));
    }

    #[test]
    fn disabled_manager_never_hits() {
        let mut manager = CacheManager::new("/tmp/cache", CacheStrategy::Content);
        let path = Path::new("/project/a.css");
        manager.set(path, "f", "c");
        manager.disable();
        assert!(manager.get(path).is_none());
        assert!(!manager.is_unchanged(path, "f", "c"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.set(Path::new("/project/a.css"), "f", "c");
        manager.save().unwrap();

        let mut loaded = manager_in(dir.path());
        loaded.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.is_unchanged(Path::new("/project/a.css"), "f", "c"));
        assert!(!dir.path().join(".sheetlintcache.tmp").exists());
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.load().unwrap();
        assert!(manager.is_empty());
    }

    #[test]
    fn load_garbage_is_corrupted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CACHE_FILE), b"not a cache").unwrap();
        let mut manager = manager_in(dir.path());
        assert!(matches!(manager.load(), Err(CacheError::Corrupted(_))));
    }

    #[test]
    fn reconcile_prunes_unvisited_entries() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.set(Path::new("/project/a.css"), "f", "c");
        manager.set(Path::new("/project/b.css"), "f", "c");
        manager.save().unwrap();

        let mut next = manager_in(dir.path());
        next.load().unwrap();
        assert!(next.is_unchanged(Path::new("/project/a.css"), "f", "c"));
        next.reconcile().unwrap();
        assert_eq!(next.len(), 1);

        let mut reloaded = manager_in(dir.path());
        reloaded.load().unwrap();
        assert!(reloaded.get(Path::new("/project/b.css")).is_none());
    }

    #[test]
    fn destroy_removes_file() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        manager.set(Path::new("/project/a.css"), "f", "c");
        manager.save().unwrap();
        assert!(manager.cache_file().exists());

        manager.destroy().unwrap();
        assert!(!manager.cache_file().exists());
        assert!(manager.is_empty());
        // second destroy is a no-op
        manager.destroy().unwrap();
    }

    #[test]
    fn metadata_fingerprint_tracks_file_changes() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.css");
        fs::write(&file, "a {}").unwrap();

        let manager = CacheManager::new(dir.path().join("c"), CacheStrategy::Metadata);
        let first = manager.fingerprint(&file, "ignored").unwrap();
        assert_eq!(first, manager.fingerprint(&file, "different").unwrap());

        fs::write(&file, "a { color: red }").unwrap();
        assert_ne!(first, manager.fingerprint(&file, "").unwrap());
    }

    #[test]
    fn metadata_fingerprint_of_missing_file_is_read_error() {
        let manager = CacheManager::new("/tmp/c", CacheStrategy::Metadata);
        let err = manager
            .fingerprint(Path::new("/definitely/not/here.css"), "")
            .unwrap_err();
        assert!(matches!(err, CacheError::ReadError(_)));
    }

    #[test]
    fn content_fingerprint_is_content_hash() {
        let manager = CacheManager::new("/tmp/c", CacheStrategy::Content);
        assert_eq!(
            manager.fingerprint(Path::new("/x.css"), "a {}").unwrap(),
            CacheManager::hash_content("a {}")
        );
    }
}
