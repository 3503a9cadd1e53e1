//! Cache backend trait definition.

use super::{CacheEntry, CacheStats};
use crate::error::CacheError;
use std::path::Path;
use std::time::SystemTime;

/// Trait for cache backends
pub trait CacheBackend: Send + Sync {
    /// Get a cached entry if it exists and is still valid
    ///
    /// The entry is only returned if the file hasn't changed size or
    /// modification time since it was cached.
    fn get(
        &self,
        path: &Path,
        current_size: u64,
        current_modified: SystemTime,
    ) -> Result<Option<CacheEntry>, CacheError>;

    /// Store an entry, replacing any previous one for the same path
    fn set(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Remove a specific entry
    fn remove(&self, path: &Path) -> Result<(), CacheError>;

    /// Clear all cached entries
    fn clear(&self) -> Result<(), CacheError>;

    /// Get cache statistics
    fn stats(&self) -> Result<CacheStats, CacheError>;
}
