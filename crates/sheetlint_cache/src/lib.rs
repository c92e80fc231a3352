//! # sheetlint_cache
//!
//! Result cache for sheetlint.
//!
//! Only inputs that linted clean are cached, so a hit means the input can be
//! skipped entirely.
//!
//! ## Cache Strategy
//!
//! 1. **Fingerprint**: blake3 of the content, or of mtime and size with
//!    [`CacheStrategy::Metadata`]
//! 2. **Config-aware**: an entry only matches under the same configuration hash
//! 3. **Pruned**: entries for inputs not visited during a run are dropped when
//!    the run reconciles the cache
//!
//! ## Storage
//!
//! One file per working directory, serialized with `rkyv` and replaced
//! atomically on save.

mod entry;
mod error;
mod manager;

pub use entry::{CacheEntry, CacheStrategy};
pub use error::CacheError;
pub use manager::{CacheManager, DEFAULT_CACHE_FILE};
