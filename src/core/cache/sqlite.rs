//! SQLite cache backend for persistent storage.

use super::{CacheBackend, CacheEntry, CacheStats};
use crate::core::evidence::Verdict;
use crate::error::CacheError;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// SQLite-backed persistent cache
pub struct SqliteCache {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteCache {
    /// Open or create a cache database at the given path
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| CacheError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS verdicts (
                path TEXT PRIMARY KEY,
                verdict TEXT NOT NULL,
                confidence_score INTEGER NOT NULL,
                file_size INTEGER NOT NULL,
                file_modified INTEGER NOT NULL,
                cached_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })
    }

    fn to_timestamp(time: SystemTime) -> i64 {
        time.duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs() as i64
    }

    fn from_timestamp(timestamp: i64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(timestamp.max(0) as u64)
    }
}

impl CacheBackend for SqliteCache {
    fn get(
        &self,
        path: &Path,
        current_size: u64,
        current_modified: SystemTime,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.lock()?;
        let path_str = path.to_string_lossy();

        let result = conn.query_row(
            "SELECT verdict, confidence_score, file_size, file_modified, cached_at
             FROM verdicts WHERE path = ?",
            [&path_str],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        );

        let (verdict, score, size, modified, cached_at) = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(CacheError::QueryFailed(e.to_string())),
        };

        let verdict = Verdict::from_name(&verdict).ok_or_else(|| CacheError::Corrupted {
            path: self.db_path.clone(),
        })?;
        let entry = CacheEntry {
            path: path.to_path_buf(),
            verdict,
            confidence_score: score.max(0) as u32,
            file_size: size.max(0) as u64,
            file_modified: Self::from_timestamp(modified),
            cached_at: Self::from_timestamp(cached_at),
        };

        Ok(entry
            .is_valid_for(current_size, current_modified)
            .then_some(entry))
    }

    fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO verdicts
             (path, verdict, confidence_score, file_size, file_modified, cached_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                entry.path.to_string_lossy(),
                entry.verdict.name(),
                entry.confidence_score as i64,
                entry.file_size as i64,
                Self::to_timestamp(entry.file_modified),
                Self::to_timestamp(entry.cached_at),
            ],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), CacheError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM verdicts WHERE path = ?", [&path.to_string_lossy()])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM verdicts", [])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*), MAX(cached_at) FROM verdicts", [], |row| {
            Ok(CacheStats {
                total_entries: row.get::<_, i64>(0)?.max(0) as usize,
                newest_entry: row.get::<_, Option<i64>>(1)?.map(Self::from_timestamp),
            })
        })
        .map_err(|e| CacheError::QueryFailed(e.to_string()))
    }
}
