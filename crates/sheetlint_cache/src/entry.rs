//! Cache entry types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CacheError;

/// How an input is fingerprinted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    /// Hash of the modification time and size.
    #[default]
    Metadata,
    /// Hash of the file content.
    Content,
}

impl CacheStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            CacheStrategy::Metadata => "metadata",
            CacheStrategy::Content => "content",
        }
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metadata" => Ok(CacheStrategy::Metadata),
            "content" => Ok(CacheStrategy::Content),
            other => Err(CacheError::InvalidStrategy(other.to_string())),
        }
    }
}

/// The last clean lint of one input.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
pub struct CacheEntry {
    /// Input fingerprint under the manager's strategy.
    pub fingerprint: String,

    /// Hash of the configuration the input was linted with.
    pub config_hash: String,

    /// Unix seconds when this entry was written.
    pub updated_at: u64,
}

impl CacheEntry {
    /// Creates a new cache entry stamped with the current time.
    pub fn new(fingerprint: impl Into<String>, config_hash: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            config_hash: config_hash.into(),
            updated_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Checks if this cache entry is valid for the given hashes.
    pub fn is_valid(&self, fingerprint: &str, config_hash: &str) -> bool {
        self.fingerprint == fingerprint && self.config_hash == config_hash
    }
}
