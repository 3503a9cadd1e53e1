//! Executor for organization plans.

use super::types::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Executes organization plans
pub struct OrganizeExecutor;

impl OrganizeExecutor {
    /// Move every planned file, reporting progress as `(done, total, name)`
    ///
    /// A file that cannot be moved is recorded in `errors` and left in place.
    pub fn execute<F>(plan: &OrganizePlan, mut on_progress: F) -> OrganizeResult
    where
        F: FnMut(usize, usize, &str),
    {
        const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

        let start = Instant::now();
        let mut last_progress = Instant::now();
        let total = plan.files.len();
        let mut result = OrganizeResult::default();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();

        for (i, file) in plan.files.iter().enumerate() {
            let name = file
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let now = Instant::now();
            if now.duration_since(last_progress) >= PROGRESS_INTERVAL {
                on_progress(i + 1, total, &name);
                last_progress = now;
            }

            if let Some(parent) = file.destination.parent() {
                if !created_dirs.contains(parent) {
                    if !parent.is_dir() {
                        if let Err(e) = fs::create_dir_all(parent) {
                            result
                                .errors
                                .push(format!("Failed to create {}: {}", parent.display(), e));
                            continue;
                        }
                        result.folders_created += 1;
                    }
                    created_dirs.insert(parent.to_path_buf());
                }
            }

            if !file.source.exists() {
                result.errors.push(format!("{}: Source file not found", name));
                continue;
            }
            if file.destination.exists() {
                result
                    .errors
                    .push(format!("{}: {} already exists", name, file.destination.display()));
                continue;
            }

            match move_file(&file.source, &file.destination) {
                Ok(()) => {
                    debug!(
                        from = %file.source.display(),
                        to = %file.destination.display(),
                        verdict = %file.verdict,
                        "Moved file"
                    );
                    result.files_moved += 1;
                    result.total_size_bytes += file.size_bytes;
                }
                Err(e) => {
                    warn!(path = %file.source.display(), error = %e, "Failed to move file");
                    result.errors.push(format!("{}: {}", name, e));
                }
            }
        }

        on_progress(total, total, "");
        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }
}

/// Rename, falling back to copy and delete across filesystems
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    fs::rename(source, destination).or_else(|_| {
        let source_size = fs::metadata(source)?.len();
        fs::copy(source, destination)?;

        // Keep the source unless the copy is complete
        let dest_size = fs::metadata(destination)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(destination);
            return Err(io::Error::other(format!(
                "Copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            )));
        }

        fs::remove_file(source)
    })
}
