//! Directory walking implementation using walkdir.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{MediaFile, MediaFilter, ScanResult};
use crate::error::ScanError;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
    /// Directories never descended into, such as the organize folder
    pub exclude: Vec<PathBuf>,
}

/// Scanner implementation using the walkdir crate
#[derive(Debug, Clone)]
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: MediaFilter,
}

impl WalkDirScanner {
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = MediaFilter::new().with_hidden(config.include_hidden);
        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }
        Self { config, filter }
    }

    /// Walk `root` and collect media files
    ///
    /// Fails only when `root` is not a directory; unreadable entries are
    /// collected as non-fatal errors.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let exclude = &self.config.exclude;
        let entries = walker.into_iter().filter_entry(|entry| {
            // Never prune the root itself, even if it is a dot-directory
            if entry.depth() == 0 {
                return true;
            }
            (include_hidden || !MediaFilter::is_hidden(entry.path()))
                && !exclude.iter().any(|dir| entry.path() == dir)
        });

        let mut result = ScanResult::default();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() || !self.filter.should_include(entry.path()) {
                        continue;
                    }
                    match entry.metadata() {
                        Ok(metadata) => result.files.push(MediaFile {
                            path: entry.path().to_path_buf(),
                            size: metadata.len(),
                            modified: metadata.modified().ok(),
                        }),
                        Err(e) => result.errors.push(walk_error(entry.path().to_path_buf(), e)),
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    result.errors.push(walk_error(path, e));
                }
            }
        }

        debug!(
            root = %root.display(),
            files = result.files.len(),
            errors = result.errors.len(),
            "Scan complete"
        );
        Ok(result)
    }
}

fn walk_error(path: PathBuf, error: walkdir::Error) -> ScanError {
    ScanError::Walk {
        path,
        reason: error.to_string(),
    }
}
