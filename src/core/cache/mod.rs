//! # Cache Module
//!
//! Remembers files that scored UNLIKELY so the next scan of the same folder
//! can skip them while they stay unchanged.
//!
//! ## Invalidation
//! An entry is only honoured while the file's size and modification time
//! (at second precision) match what was recorded. Any file that later scores
//! POSSIBLE or higher is dropped from the cache.
//!
//! ## Backends
//! - `SqliteCache` - Persistent storage using SQLite
//! - `InMemoryCache` - For testing

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryCache;
pub use sqlite::SqliteCache;
pub use traits::CacheBackend;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::evidence::{EvidenceResult, Verdict};
use crate::core::scanner::MediaFile;
use crate::error::CacheError;

/// Default cache file name inside the organize folder
pub const CACHE_FILE_NAME: &str = "scan_cache.db";

/// A remembered scoring outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub path: PathBuf,
    pub verdict: Verdict,
    pub confidence_score: u32,
    /// File size at time of analysis
    pub file_size: u64,
    /// File modification time at time of analysis
    pub file_modified: SystemTime,
    /// When the entry was cached
    pub cached_at: SystemTime,
}

impl CacheEntry {
    pub fn new(file: &MediaFile, modified: SystemTime, result: &EvidenceResult) -> Self {
        Self {
            path: file.path.clone(),
            verdict: result.verdict,
            confidence_score: result.confidence_score,
            file_size: file.size,
            file_modified: modified,
            cached_at: SystemTime::now(),
        }
    }

    /// Check if this entry is still valid for a file
    pub fn is_valid_for(&self, file_size: u64, file_modified: SystemTime) -> bool {
        // Second precision, matching what SQLite stores
        self.file_size == file_size && unix_secs(self.file_modified) == unix_secs(file_modified)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub newest_entry: Option<SystemTime>,
}

/// Look up a scanned file, returning an entry only when it may be skipped
pub fn lookup(cache: &dyn CacheBackend, file: &MediaFile) -> Result<Option<CacheEntry>, CacheError> {
    let Some(modified) = file.modified else {
        return Ok(None);
    };
    Ok(cache
        .get(&file.path, file.size, modified)?
        .filter(|entry| entry.verdict == Verdict::Unlikely))
}

/// Record a fresh result: UNLIKELY files are remembered, anything else is forgotten
pub fn record(cache: &dyn CacheBackend, file: &MediaFile, result: &EvidenceResult) -> Result<(), CacheError> {
    match file.modified {
        Some(modified) if result.verdict == Verdict::Unlikely => {
            cache.set(CacheEntry::new(file, modified, result))
        }
        _ => cache.remove(&file.path),
    }
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn file(modified: Option<SystemTime>) -> MediaFile {
        MediaFile {
            path: PathBuf::from("/sdcard/Download/clip.mp4"),
            size: 1000,
            modified,
        }
    }

    fn result(score: u32, verdict: Verdict) -> EvidenceResult {
        EvidenceResult {
            confidence_score: score,
            verdict,
            ..EvidenceResult::default()
        }
    }

    #[test]
    fn entry_valid_when_unchanged() {
        let now = SystemTime::now();
        let entry = CacheEntry::new(&file(Some(now)), now, &result(0, Verdict::Unlikely));
        assert!(entry.is_valid_for(1000, now));
    }

    #[test]
    fn entry_invalid_when_size_or_time_changed() {
        let now = SystemTime::now();
        let entry = CacheEntry::new(&file(Some(now)), now, &result(0, Verdict::Unlikely));
        assert!(!entry.is_valid_for(2000, now));
        assert!(!entry.is_valid_for(1000, now + Duration::from_secs(60)));
    }

    #[test]
    fn only_unlikely_results_are_remembered() {
        let cache = InMemoryCache::new();
        let now = SystemTime::now();
        let clip = file(Some(now));

        record(&cache, &clip, &result(10, Verdict::Unlikely)).unwrap();
        assert_eq!(lookup(&cache, &clip).unwrap().map(|e| e.confidence_score), Some(10));

        record(&cache, &clip, &result(35, Verdict::Possible)).unwrap();
        assert_eq!(lookup(&cache, &clip).unwrap(), None);
        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn changed_file_is_not_skipped() {
        let cache = InMemoryCache::new();
        let now = SystemTime::now();
        record(&cache, &file(Some(now)), &result(0, Verdict::Unlikely)).unwrap();

        let touched = file(Some(now + Duration::from_secs(5)));
        assert_eq!(lookup(&cache, &touched).unwrap(), None);
    }

    #[test]
    fn files_without_mtime_bypass_the_cache() {
        let cache = InMemoryCache::new();
        record(&cache, &file(None), &result(0, Verdict::Unlikely)).unwrap();
        assert_eq!(cache.stats().unwrap().total_entries, 0);
        assert_eq!(lookup(&cache, &file(None)).unwrap(), None);
    }
}
